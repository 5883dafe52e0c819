use reveal_poker_engine::config::{ConfigError, GameParams, TimeoutRules};
use reveal_poker_engine::domain::chips::Chips;
use reveal_poker_engine::domain::table::TableStatus;

#[test]
fn standard_params_survive_json() {
    let params = GameParams::standard();
    let json = params.to_json_string().unwrap();
    assert!(json.contains("allowed_small_blinds"));

    let parsed = GameParams::from_json_str(&json).unwrap();
    assert_eq!(parsed, params);
    assert_eq!(GameParams::default(), params);
}

#[test]
fn params_are_read_from_handwritten_json() {
    let json = r#"{
        "allowed_small_blinds": [50, 100],
        "allowed_table_sizes": [2, 6, 9],
        "rake_percent": 2.5,
        "max_rake": 3000,
        "player_pay_percent": 60,
        "min_buyin_sb": 20,
        "max_buyin_sb": 100,
        "timeouts": { "warning_secs": 20, "last_secs": 10, "dead_table_secs": 30 }
    }"#;

    let params = GameParams::from_json_str(json).unwrap();
    assert!(params.is_small_blind_allowed(Chips(50)));
    assert!(!params.is_small_blind_allowed(Chips(200)));
    assert!(params.is_table_size_allowed(9));
    assert_eq!(params.buyin_range(Chips(50)), (Chips(1_000), Chips(5_000)));
    assert_eq!(params.timeouts.timeout_for(TableStatus::WaitPlayersAct), 35);
    assert_eq!(params.timeouts.timeout_for(TableStatus::WaitShuffle), 10);
}

#[test]
fn broken_json_is_reported() {
    let err = GameParams::from_json_str("{ \"allowed_small_blinds\": ").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn invalid_values_are_rejected() {
    let cases: [(&str, fn(&mut GameParams)); 9] = [
        ("allowed_small_blinds", |p: &mut GameParams| p.allowed_small_blinds.clear()),
        ("allowed_small_blinds", |p: &mut GameParams| p.allowed_small_blinds.push(Chips::ZERO)),
        ("allowed_table_sizes", |p: &mut GameParams| p.allowed_table_sizes = vec![11]),
        ("allowed_table_sizes", |p: &mut GameParams| p.allowed_table_sizes.clear()),
        ("rake_percent", |p: &mut GameParams| p.rake_percent = 101.0),
        ("player_pay_percent", |p: &mut GameParams| p.player_pay_percent = 120),
        ("buyin range", |p: &mut GameParams| p.min_buyin_sb = 1),
        ("buyin range", |p: &mut GameParams| p.max_buyin_sb = p.min_buyin_sb - 1),
        ("timeouts.last_secs", |p: &mut GameParams| p.timeouts = TimeoutRules::new(25, 0, 10)),
    ];

    for (field, spoil) in cases {
        let mut params = GameParams::standard();
        spoil(&mut params);
        match params.validate() {
            Err(ConfigError::Invalid(name)) => assert_eq!(name, field),
            other => panic!("{field}: ожидалась ошибка, получено {other:?}"),
        }
    }
}

#[test]
fn player_gets_more_time_to_act_than_to_send_keys() {
    let rules = TimeoutRules::standard();
    assert_eq!(rules.timeout_for(TableStatus::WaitPlayersAct), 45);
    assert_eq!(rules.timeout_for(TableStatus::WaitKeysForShowdown), 15);
    assert_eq!(TimeoutRules::default(), rules);
}
