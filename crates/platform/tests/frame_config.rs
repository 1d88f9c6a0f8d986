use platform::FrameConfig;
use std::time::Duration;

#[test]
fn frame_budget_from_toml() {
    let config: FrameConfig = toml::from_str("frame_budget_ms = 33").unwrap();
    assert_eq!(config.frame_budget(), Duration::from_millis(33));
    assert_eq!(toml::from_str::<FrameConfig>("").unwrap(), FrameConfig::default());
}
