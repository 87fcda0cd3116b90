use anyhow::Result;
use space_engine::Engine;
use space_prototype::{config::CONFIG_FILE, GameConfig, SpacePrototype};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load_or_default(CONFIG_FILE);
    Engine::with_config(config.engine_config()).run(SpacePrototype::new(config))
}
