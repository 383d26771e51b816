//! Environment overrides live in their own test binary: the variables are
//! process wide and would leak into other config tests.

use std::env;
use std::path::Path;

use ntree::config::Settings;

#[test]
fn given_env_vars_when_loading_then_env_wins_over_config_file() {
    env::set_var("NTREE__DEMO__FANOUT", "7");
    env::set_var("NTREE__RENDER__SHOW_IDS", "true");

    let settings = Settings::load(Some(Path::new("tests/resources/ntree.toml"))).unwrap();

    env::remove_var("NTREE__DEMO__FANOUT");
    env::remove_var("NTREE__RENDER__SHOW_IDS");

    assert_eq!(settings.demo.fanout, 7);
    assert!(settings.render.show_ids);
    assert_eq!(settings.render.empty_label, "(none)");
}
