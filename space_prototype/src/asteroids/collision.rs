use std::cmp::Ordering;

use space_engine::{Rect, Vec2};

use super::{Asteroid, AsteroidAsset, AsteroidSystem};

/// World-space box of the scaled sprite, centered on the asteroid.
fn world_bounds(asteroid: &Asteroid, asset: &AsteroidAsset) -> Rect {
    let size = asteroid.scaled_size(asset);
    Rect::new(
        asteroid.position.x - size.x * 0.5,
        asteroid.position.y - size.y * 0.5,
        size.x,
        size.y,
    )
}

/// Bounding-circle and box rejection. Returns the shared world rectangle
/// when the two sprites might touch.
pub(crate) fn broad_phase(
    a: &Asteroid,
    asset_a: &AsteroidAsset,
    b: &Asteroid,
    asset_b: &AsteroidAsset,
) -> Option<Rect> {
    let reach = a.radius(asset_a) + b.radius(asset_b);
    if a.position.distance_squared(b.position) > reach * reach {
        return None;
    }

    let box_a = world_bounds(a, asset_a);
    let box_b = world_bounds(b, asset_b);
    let left = box_a.x.max(box_b.x);
    let top = box_a.y.max(box_b.y);
    let right = box_a.right().min(box_b.right());
    let bottom = box_a.bottom().min(box_b.bottom());
    if right <= left || bottom <= top {
        return None;
    }

    Some(Rect::new(left, top, right - left, bottom - top))
}

/// Pixel-accurate overlap of two asteroids.
///
/// Samples the finer of the two masks (smaller scale, then position as a
/// tie-break) against the other. Two asteroids with the same pose are
/// sampled both ways, so swapping the arguments never changes the answer.
pub fn overlap(a: &Asteroid, asset_a: &AsteroidAsset, b: &Asteroid, asset_b: &AsteroidAsset) -> bool {
    let Some(region) = broad_phase(a, asset_a, b, asset_b) else {
        return false;
    };

    match sampling_order(a, b) {
        Ordering::Less => sample_masks(a, asset_a, b, asset_b, region),
        Ordering::Greater => sample_masks(b, asset_b, a, asset_a, region),
        Ordering::Equal => {
            sample_masks(a, asset_a, b, asset_b, region)
                || sample_masks(b, asset_b, a, asset_a, region)
        }
    }
}

fn sampling_order(a: &Asteroid, b: &Asteroid) -> Ordering {
    a.scale
        .total_cmp(&b.scale)
        .then(a.position.x.total_cmp(&b.position.x))
        .then(a.position.y.total_cmp(&b.position.y))
}

/// Walk the solid pixels of `a` inside `region` and look each pixel center
/// up in `b`'s mask. Stops at the first shared solid pixel.
fn sample_masks(
    a: &Asteroid,
    asset_a: &AsteroidAsset,
    b: &Asteroid,
    asset_b: &AsteroidAsset,
    region: Rect,
) -> bool {
    let box_a = world_bounds(a, asset_a);
    let box_b = world_bounds(b, asset_b);
    let origin_a = Vec2::new(box_a.x, box_a.y);
    let origin_b = Vec2::new(box_b.x, box_b.y);

    let start_x = (((region.x - origin_a.x) / a.scale).floor() as i32).max(0);
    let end_x = (((region.right() - origin_a.x) / a.scale).ceil() as i32).min(asset_a.width() as i32);
    let start_y = (((region.y - origin_a.y) / a.scale).floor() as i32).max(0);
    let end_y =
        (((region.bottom() - origin_a.y) / a.scale).ceil() as i32).min(asset_a.height() as i32);

    let inv_scale_b = 1.0 / b.scale;

    for y in start_y..end_y {
        let world_y = origin_a.y + (y as f32 + 0.5) * a.scale;
        let by = ((world_y - origin_b.y) * inv_scale_b).floor() as i32;
        if by < 0 || by >= asset_b.height() as i32 {
            continue;
        }

        let mut world_x = origin_a.x + (start_x as f32 + 0.5) * a.scale;
        for x in start_x..end_x {
            if asset_a.is_solid(x, y) {
                let bx = ((world_x - origin_b.x) * inv_scale_b).floor() as i32;
                if asset_b.is_solid(bx, by) {
                    return true;
                }
            }
            world_x += a.scale;
        }
    }

    false
}

impl AsteroidSystem {
    /// Whether the asteroids at `i` and `j` touch.
    pub fn overlaps(&self, i: usize, j: usize) -> bool {
        let (Some(a), Some(b)) = (self.asteroids.get(i), self.asteroids.get(j)) else {
            return false;
        };
        match (self.assets.get(a.asset_index), self.assets.get(b.asset_index)) {
            (Some(asset_a), Some(asset_b)) => overlap(a, asset_a, b, asset_b),
            _ => false,
        }
    }

    /// Remove both asteroids of every touching pair.
    pub(crate) fn resolve_collisions(&mut self) {
        let mut i = 0;
        'outer: while i < self.asteroids.len() {
            let mut j = i + 1;
            while j < self.asteroids.len() {
                if self.overlaps(i, j) {
                    // Higher index first so `i` still names the same asteroid.
                    self.asteroids.swap_remove(j);
                    self.asteroids.swap_remove(i);
                    // Slot `i` now holds a different asteroid; scan it again.
                    continue 'outer;
                }
                j += 1;
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use space_engine::TextureHandle;

    fn opaque(size: u32) -> AsteroidAsset {
        let rgba = vec![255u8; (size * size * 4) as usize];
        AsteroidAsset::from_rgba(TextureHandle::from_raw(1), size, size, &rgba)
    }

    /// `size` x `size` image with only the pixels inside `solid` opaque.
    fn with_solid(size: u32, solid: impl Fn(u32, u32) -> bool) -> AsteroidAsset {
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let alpha = if solid(x, y) { 255 } else { 0 };
                rgba.extend_from_slice(&[200, 200, 200, alpha]);
            }
        }
        AsteroidAsset::from_rgba(TextureHandle::from_raw(2), size, size, &rgba)
    }

    fn at(x: f32, y: f32, scale: f32) -> Asteroid {
        Asteroid::new(Vec2::new(x, y), scale, 0, 100.0)
    }

    #[test]
    fn opaque_squares_five_apart_overlap() {
        let asset = opaque(10);
        let a = at(0.0, 0.0, 1.0);
        let b = at(5.0, 0.0, 1.0);

        let region = broad_phase(&a, &asset, &b, &asset).unwrap();
        assert_eq!(region, Rect::new(0.0, -5.0, 5.0, 10.0));
        assert!(overlap(&a, &asset, &b, &asset));
    }

    #[test]
    fn squares_twenty_apart_are_rejected_early() {
        let asset = opaque(10);
        let a = at(0.0, 0.0, 1.0);
        let b = at(20.0, 0.0, 1.0);

        assert!(broad_phase(&a, &asset, &b, &asset).is_none());
        assert!(!overlap(&a, &asset, &b, &asset));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let asset = opaque(10);
        assert!(!overlap(&at(0.0, 0.0, 1.0), &asset, &at(10.0, 0.0, 1.0), &asset));
    }

    #[test]
    fn transparent_corners_do_not_collide() {
        // Solid 2x2 core in the middle of a 10x10 image.
        let asset = with_solid(10, |x, y| (4..6).contains(&x) && (4..6).contains(&y));
        let a = at(0.0, 0.0, 1.0);
        let b = at(7.0, 7.0, 1.0);

        assert!(broad_phase(&a, &asset, &b, &asset).is_some());
        assert!(!overlap(&a, &asset, &b, &asset));

        let c = at(1.0, 1.0, 1.0);
        assert!(overlap(&a, &asset, &c, &asset));
    }

    #[test]
    fn scaled_sprites_overlap_by_world_extent() {
        let asset = opaque(10);
        // 20 units wide at scale 2, so a 14 unit gap still overlaps.
        let big = at(0.0, 0.0, 2.0);
        let small = at(14.0, 0.0, 1.0);
        assert!(overlap(&big, &asset, &small, &asset));
        assert!(!overlap(&big, &asset, &at(15.0, 0.0, 1.0), &asset));
    }

    #[test]
    fn result_does_not_depend_on_argument_order() {
        let ring = with_solid(16, |x, y| {
            let dx = x as f32 - 7.5;
            let dy = y as f32 - 7.5;
            let d = (dx * dx + dy * dy).sqrt();
            (4.0..7.5).contains(&d)
        });
        let blob = with_solid(12, |x, y| (x + y) % 3 != 0);

        let mut rng = fastrand::Rng::with_seed(9);
        for _ in 0..500 {
            let a = at(0.0, 0.0, 0.5 + rng.f32() * 1.5);
            let b = Asteroid {
                asset_index: 1,
                ..at(rng.f32() * 30.0 - 15.0, rng.f32() * 30.0 - 15.0, 0.5 + rng.f32() * 1.5)
            };
            assert_eq!(
                overlap(&a, &ring, &b, &blob),
                overlap(&b, &blob, &a, &ring),
                "a={a:?} b={b:?}"
            );
        }
    }

    #[test]
    fn same_pose_with_different_assets_is_symmetric() {
        let corner = with_solid(10, |x, y| x == 0 && y == 0);
        let inset = with_solid(11, |x, y| x == 1 && y == 1);
        let a = at(0.0, 0.0, 1.0);
        let b = Asteroid {
            asset_index: 1,
            ..at(0.0, 0.0, 1.0)
        };

        assert!(overlap(&a, &corner, &b, &inset));
        assert!(overlap(&b, &inset, &a, &corner));
    }

    #[test]
    fn integer_offsets_at_unit_scale_are_symmetric_in_either_walk() {
        let ring = with_solid(8, |x, y| x == 0 || y == 0 || x == 7 || y == 7);
        for dx in -9..=9 {
            for dy in -9..=9 {
                let a = at(0.0, 0.0, 1.0);
                let b = at(dx as f32, dy as f32, 1.0);
                let Some(region) = broad_phase(&a, &ring, &b, &ring) else {
                    continue;
                };
                assert_eq!(
                    sample_masks(&a, &ring, &b, &ring, region),
                    sample_masks(&b, &ring, &a, &ring, region),
                    "offset ({dx}, {dy})"
                );
            }
        }
    }
}
