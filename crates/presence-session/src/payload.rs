//! Turning the configured activity into the payload sent on each refresh.

use presence_config::ActivityConfig;
use presence_ipc::{Activity, Assets, Button, Timestamps};

/// Buttons beyond this are not shown by the service.
const MAX_BUTTONS: usize = 2;

/// Build a fresh payload. `start_timestamp` is the session's fixed start, in Unix ms.
pub fn build_activity(config: &ActivityConfig, start_timestamp: i64) -> Activity {
    let assets = Assets {
        large_image: non_empty(&config.large_image_key),
        large_text: non_empty(&config.large_image_text),
        small_image: non_empty(&config.small_image_key),
        small_text: non_empty(&config.small_image_text),
    };
    let has_assets = assets != Assets::default();

    Activity {
        details: non_empty(&config.details),
        state: non_empty(&config.state),
        timestamps: Some(Timestamps {
            start: Some(start_timestamp),
            end: None,
        }),
        assets: has_assets.then_some(assets),
        instance: config.instance,
        buttons: config
            .buttons
            .iter()
            .take(MAX_BUTTONS)
            .map(|b| Button {
                label: b.label.clone(),
                url: b.url.clone(),
            })
            .collect(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
