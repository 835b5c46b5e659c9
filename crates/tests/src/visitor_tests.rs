//! A visitor's page runtime driven against a live API.

use std::sync::Arc;

use chrono::Utc;
use herald_services::manager::PageEffect;
use herald_services::notify::payload::{NotificationContent, PushData};
use herald_services::notify::{ClickOutcome, PageMessage, PushPayload, WindowClient};
use herald_services::{
    AnnouncementManager, AnnouncementSource, BackgroundHandler, DisplayState, MemoryStateStore,
    Phase, SiteClient,
};

use crate::fixtures::test_app::TestApp;

type Browser = Arc<MemoryStateStore>;

fn page(app: &TestApp, storage: &Browser) -> AnnouncementManager<SiteClient, Browser> {
    AnnouncementManager::new(
        SiteClient::new(&app.base_url),
        DisplayState::from_settings(storage.clone(), &app.settings.notifications),
    )
}

#[tokio::test]
async fn closed_announcement_stays_closed_across_reloads() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;
    app.seed_announcement(&token, "Routine", "low").await;
    let urgent = app.seed_announcement(&token, "Urgent", "high").await;

    let storage = Browser::default();

    let mut first = page(&app, &storage);
    let shown = first.load_active(Utc::now()).await.unwrap();
    assert_eq!(shown.id, urgent);
    assert_eq!(first.phase(), Phase::Shown);
    assert!(first.close());

    let mut second = page(&app, &storage);
    let shown = second.load_active(Utc::now()).await.unwrap();
    assert_eq!(shown.title, "Routine");
    assert_eq!(second.bell_count(), 2);
    assert!(second.close());

    let mut third = page(&app, &storage);
    assert!(third.load_active(Utc::now()).await.is_none());
    assert_eq!(third.phase(), Phase::Hidden);
    assert_eq!(third.bell_count(), 2);

    let reopened = third.bell_clicked(Utc::now()).unwrap();
    assert_eq!(reopened.id, urgent);
    assert_eq!(third.phase(), Phase::Shown);
}

#[tokio::test]
async fn closed_list_honours_configured_limit() {
    let app = TestApp::spawn_with_settings(|s| s.notifications.closed_limit = 1).await;
    let token = app.login_admin().await;
    let first = app.seed_announcement(&token, "Bake sale", "high").await;
    app.seed_announcement(&token, "Book drive", "low").await;

    let storage = Browser::default();
    let mut page_one = page(&app, &storage);
    assert_eq!(page_one.load_active(Utc::now()).await.unwrap().id, first);
    assert!(page_one.close());

    let mut page_two = page(&app, &storage);
    assert_eq!(page_two.load_active(Utc::now()).await.unwrap().title, "Book drive");
    assert!(page_two.close());

    // Only the latest dismissal is remembered, so the first one returns.
    let mut page_three = page(&app, &storage);
    assert_eq!(page_three.load_active(Utc::now()).await.unwrap().id, first);
    assert_eq!(page_three.state().closed_ids().len(), 1);
}

#[tokio::test]
async fn minimized_announcement_is_restored_minimized() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;
    app.seed_announcement(&token, "Fundraiser", "medium").await;

    let storage = Browser::default();
    let mut first = page(&app, &storage);
    first.load_active(Utc::now()).await;
    assert!(first.minimize());

    let mut second = page(&app, &storage);
    second.load_active(Utc::now()).await;
    assert_eq!(second.phase(), Phase::Minimized);
    assert!(second.expand());
    assert_eq!(second.phase(), Phase::Shown);
}

#[tokio::test]
async fn deep_link_shows_closed_announcement_and_cleans_url() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;
    let id = app.seed_announcement(&token, "Linked", "low").await;

    let storage = Browser::default();
    DisplayState::from_settings(storage.clone(), &app.settings.notifications).close(&id);

    let mut manager = page(&app, &storage);
    assert!(manager.load_active(Utc::now()).await.is_none());

    let link = manager
        .consume_deep_link(
            &format!("https://herald.test/events?showAnnouncement={id}&ref=mail"),
            Utc::now(),
        )
        .await;
    assert!(link.shown);
    assert_eq!(link.cleaned_url, "https://herald.test/events?ref=mail");
    assert_eq!(manager.current().unwrap().id, id);
    assert_eq!(manager.phase(), Phase::Shown);
}

#[tokio::test]
async fn deep_link_to_missing_announcement_is_ignored() {
    let app = TestApp::spawn().await;
    let storage = Browser::default();
    let mut manager = page(&app, &storage);

    let link = manager
        .consume_deep_link("https://herald.test/?showAnnouncement=not-an-id", Utc::now())
        .await;
    assert!(!link.shown);
    assert_eq!(link.cleaned_url, "https://herald.test/");
    assert!(manager.current().is_none());

    let missing = manager
        .consume_deep_link(
            "https://herald.test/?showAnnouncement=65a1b2c3d4e5f60718293a4b",
            Utc::now(),
        )
        .await;
    assert!(!missing.shown);
}

#[tokio::test]
async fn subscribing_registers_visitor_with_relay() {
    let app = TestApp::spawn().await;
    let storage = Browser::default();
    let state = DisplayState::from_settings(storage.clone(), &app.settings.notifications);
    let client = SiteClient::new(&app.base_url);

    client
        .subscribe_visitor(&state, "fcm-device-token", Some("Mozilla/5.0 (iPhone)"))
        .await
        .unwrap();

    assert!(state.notifications_enabled());
    assert_eq!(state.push_token().as_deref(), Some("fcm-device-token"));

    let calls = app.relay.calls_to("/api/store-token");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body["userId"], state.visitor_id().as_str());
    assert_eq!(app.relay.token_count(), 1);
}

#[tokio::test]
async fn pushed_announcement_reaches_page_once() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;
    let id = app.seed_announcement(&token, "Snow closure", "high").await;

    let client = SiteClient::new(&app.base_url);
    let view = client.fetch_by_id(&id).await.unwrap().unwrap();

    let handler = BackgroundHandler::from_settings(&app.settings);
    let payload = PushPayload {
        notification: Some(NotificationContent {
            title: Some("Snow closure".into()),
            body: Some("The center is closed today".into()),
        }),
        data: Some(PushData {
            timestamp: Some("1767225600000".into()),
            url: None,
            priority: Some("high".into()),
            announcement: Some(view.clone()),
        }),
    };

    let now = Utc::now();
    let notification = handler.on_push(&payload, now).unwrap();
    assert_eq!(notification.data.click_action, "https://herald.test");
    assert!(handler.on_push(&payload, now).is_none());

    let outcome = handler.on_click(None, &notification.data, &[]);
    assert_eq!(
        outcome,
        ClickOutcome::OpenWindow {
            url: format!("https://herald.test/?showAnnouncement={id}"),
        }
    );

    let windows = [WindowClient {
        id: "w1".into(),
        url: "https://herald.test/about".into(),
        focusable: true,
    }];
    let ClickOutcome::Focus { window_id, message } =
        handler.on_click(Some("view"), &notification.data, &windows)
    else {
        panic!("expected the open site window to be focused");
    };
    assert_eq!(window_id, "w1");

    let storage = Browser::default();
    DisplayState::from_settings(storage.clone(), &app.settings.notifications).close(&id);
    let mut manager = page(&app, &storage);
    let effect = manager.handle_page_message(message.unwrap());
    assert_eq!(effect, PageEffect::Shown(view));
    assert_eq!(manager.phase(), Phase::Shown);
}

#[tokio::test]
async fn foreground_push_becomes_banner() {
    let app = TestApp::spawn().await;
    let handler = BackgroundHandler::from_settings(&app.settings);
    let storage = Browser::default();
    let mut manager = page(&app, &storage);

    let message = handler.on_foreground_push(&PushPayload::default());
    assert_eq!(
        message,
        PageMessage::PushReceived {
            title: "New Announcement".into(),
            body: "You have a new message from Herald Test Center".into(),
        }
    );
    let PageEffect::Banner(banner) = manager.handle_page_message(message) else {
        panic!("expected a banner");
    };
    assert_eq!(banner.ttl, std::time::Duration::from_secs(8));
}
