use path_defence_core::TowerKind;
use path_defence_simulation::{Simulation, SimulationConfig};

#[test]
fn partial_toml_overrides_defaults() {
    let config: SimulationConfig = toml::from_str(
        r#"
max_tick_seconds = 0.05

[world]
starting_money = 900
columns = 24

[scheduler]
seed = 7
"#,
    )
    .expect("valid configuration");

    assert_eq!(config.world.starting_money, 900);
    assert_eq!(config.world.columns, 24);
    assert_eq!(config.world.rows, 15);
    assert_eq!(config.scheduler.seed, 7);
    assert_eq!(config.scheduler.auto_chain_delay_ms, 5_000);
    assert_eq!(config.world.catalog.tower(TowerKind::Laser).cost, 150);

    let simulation = Simulation::new(config).expect("session");
    assert_eq!(simulation.defender().money, 900);
}

#[test]
fn default_configuration_round_trips_through_toml() {
    let config = SimulationConfig::default();
    let text = toml::to_string(&config).expect("serialisable");
    let parsed: SimulationConfig = toml::from_str(&text).expect("parsable");
    assert_eq!(parsed, config);
}
