mod common;

use common::*;
use listing_sniper::config::{ChannelConfig, SmtpConfig, TelegramCredentials};
use listing_sniper::notifier::{Digest, Notifier, NotifierMux};
use listing_sniper::Record;

fn digest(records: Vec<Record>) -> Digest {
    Digest {
        run_date: date(2026, 1, 20),
        site_name: "人才引进网".into(),
        site_url: BASE.into(),
        repo_url: None,
        include_keywords: vec!["江苏".into()],
        exclude_keywords: vec![],
        records,
    }
}

fn record(title: &str) -> Record {
    Record {
        date: date(2026, 1, 20),
        title: title.into(),
        link: "https://rcyjw.com/view/1.html".into(),
    }
}

#[tokio::test]
async fn empty_digest_reaches_no_channel() {
    let a = RecordingNotifier::new("a");
    let mux = NotifierMux::new(vec![Box::new(a.clone()) as Box<dyn Notifier>]);

    assert_eq!(mux.notify(&digest(vec![])).await, 0);
    assert_eq!(a.call_count(), 0);
}

#[tokio::test]
async fn failing_channel_does_not_block_others() {
    let broken = RecordingNotifier::failing("broken");
    let ok = RecordingNotifier::new("ok");
    let mux = NotifierMux::new(vec![
        Box::new(broken.clone()) as Box<dyn Notifier>,
        Box::new(ok.clone()) as Box<dyn Notifier>,
    ]);

    let delivered = mux.notify(&digest(vec![record("江苏招聘")])).await;

    assert_eq!(delivered, 1);
    assert_eq!(broken.call_count(), 1);
    assert_eq!(ok.calls.lock().unwrap().clone(), vec![vec!["江苏招聘".to_string()]]);
}

#[tokio::test]
async fn no_channels_is_a_quiet_no_op() {
    let mux = NotifierMux::default();
    assert_eq!(mux.notify(&digest(vec![record("江苏招聘")])).await, 0);
}

#[test]
fn channels_are_enabled_by_credentials() {
    let none = NotifierMux::from_config(&ChannelConfig::default(), &SmtpConfig::default(), "人才引进网");
    assert!(none.channel_names().is_empty());

    let config = ChannelConfig {
        pushplus_token: Some("tok".into()),
        email: None,
        telegram: Some(TelegramCredentials {
            bot_token: "123:abc".into(),
            chat_id: 42,
        }),
    };
    let mux = NotifierMux::from_config(&config, &SmtpConfig::default(), "人才引进网");
    assert_eq!(mux.channel_names(), vec!["pushplus", "telegram"]);
}
