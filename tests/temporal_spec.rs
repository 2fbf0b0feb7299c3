mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{harness, settle};
use windwalker::error::RequestKind;
use windwalker::map::BOUNDARY_SOURCE;
use windwalker::models::{View, END_OF_TREATY_ERA, FIRST_TREATY_YEAR};

fn signed_years(app: &windwalker::Windwalker<common::ScriptedService>) -> Vec<Option<i32>> {
    app.snapshot().treaties.iter().map(|t| t.signed_year()).collect()
}

mod set_year {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slower_earlier_response_never_overwrites_newer_cutoff() {
        let (app, _map) = harness("/");
        app.service().hold("list:1850");

        let (slow, fast) = tokio::join!(app.temporal().set_year(1850), async {
            settle().await;
            let fast = app.temporal().set_year(1800).await;
            app.service().release("list:1850");
            fast
        });

        assert_eq!(fast.applied(), Some(3));
        assert!(slow.is_stale());

        let state = app.snapshot();
        assert_eq!(state.year_cutoff, 1800);
        assert!(signed_years(&app).iter().all(|y| y.is_some_and(|y| y <= 1800)));
        assert_eq!(state.treaties.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn clamps_to_dataset_range() {
        let (app, _map) = harness("/");

        app.temporal().set_year(1700).await;
        assert_eq!(app.temporal().year(), FIRST_TREATY_YEAR);

        app.temporal().step(-5).await;
        assert_eq!(app.temporal().year(), FIRST_TREATY_YEAR);

        app.temporal().step(500).await;
        assert_eq!(app.temporal().year(), END_OF_TREATY_ERA);

        assert_eq!(
            app.service().list_calls(),
            [Some(1778), Some(1778), Some(1871)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn boundary_layer_matches_committed_cutoff() {
        let (app, map) = harness("/");
        app.load_boundaries().await.expect("boundaries load");

        app.temporal().set_year(1800).await;
        let pushed = map.source(BOUNDARY_SOURCE).expect("source installed");
        assert_eq!(pushed.names(), ["Hopewell 1785", "Greenville, 1795"]);
        assert_eq!(app.snapshot().visible_boundaries, 2);

        app.temporal().set_year(1860).await;
        assert_eq!(map.source(BOUNDARY_SOURCE).map(|s| s.len()), Some(3));

        app.temporal().set_year(END_OF_TREATY_ERA).await;
        let pushed = map.source(BOUNDARY_SOURCE).expect("source installed");
        assert_eq!(pushed.len(), 5);
        assert!(pushed.names().contains(&"Robinson Huron"));
    }

    #[tokio::test(start_paused = true)]
    async fn boundary_push_happens_before_list_resolves() {
        let (app, map) = harness("/");
        app.load_boundaries().await.expect("boundaries load");
        app.service().hold("list:1790");

        tokio::join!(app.temporal().set_year(1790), async {
            settle().await;
            assert_eq!(map.source(BOUNDARY_SOURCE).map(|s| s.names().len()), Some(1));
            assert_eq!(app.snapshot().year_cutoff, 1790);
            app.service().release("list:1790");
        });
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_reported_and_leaves_snapshot() {
        let (app, _map) = harness("/");
        app.temporal().set_year(1800).await;
        app.service().fail("list:1850");

        let outcome = app.temporal().set_year(1850).await;
        assert!(outcome.is_failed());

        let state = app.snapshot();
        assert_eq!(state.treaties.len(), 3);
        assert_eq!(state.last_error.as_ref().map(|e| e.kind), Some(RequestKind::TreatyList));

        app.service().recover("list:1850");
        assert!(app.temporal().set_year(1850).await.is_applied());
        assert!(app.snapshot().last_error.is_none());
    }
}

mod playback {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn plays_to_end_of_era_and_stops_itself() {
        let (app, _map) = harness("/");
        app.temporal().set_year(1869).await;

        assert!(app.temporal().toggle_play());
        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;

        assert!(!app.temporal().is_playing());
        assert_eq!(app.temporal().year(), END_OF_TREATY_ERA);
        assert_eq!(
            app.service().list_calls(),
            [Some(1869), Some(1870), Some(1871)]
        );
        assert_eq!(app.snapshot().treaties.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn advances_one_year_per_period() {
        let (app, _map) = harness("/");
        app.temporal().set_year(1800).await;

        app.temporal().toggle_play();
        tokio::time::sleep(Duration::from_millis(1250)).await;
        settle().await;

        assert_eq!(app.temporal().year(), 1802);
        assert!(app.temporal().is_playing());
        app.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_after_pause() {
        let (app, _map) = harness("/");
        app.temporal().set_year(1800).await;

        app.temporal().toggle_play();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(!app.temporal().toggle_play());
        let paused_at = app.temporal().year();
        let calls = app.service().list_calls().len();

        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;

        assert_eq!(paused_at, 1802);
        assert_eq!(app.temporal().year(), paused_at);
        assert_eq!(app.service().list_calls().len(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_during_playback_stops_the_timer() {
        let (app, _map) = harness("/");
        app.temporal().set_year(1800).await;
        app.temporal().toggle_play();
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(app.temporal().reset().await.is_applied());
        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;

        assert!(!app.temporal().is_playing());
        assert_eq!(app.temporal().year(), END_OF_TREATY_ERA);
    }

    #[tokio::test(start_paused = true)]
    async fn play_at_end_of_era_stops_without_fetching() {
        let (app, _map) = harness("/");
        app.temporal().set_year(END_OF_TREATY_ERA).await;

        app.temporal().toggle_play();
        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;

        assert!(!app.temporal().is_playing());
        assert_eq!(app.service().list_calls(), [Some(END_OF_TREATY_ERA)]);
    }

    #[tokio::test(start_paused = true)]
    async fn can_restart_after_reaching_the_end() {
        let (app, _map) = harness("/");
        app.temporal().set_year(1870).await;
        app.temporal().toggle_play();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!app.temporal().is_playing());

        app.temporal().set_year(1850).await;
        assert!(app.temporal().toggle_play());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(app.temporal().year(), 1851);
        app.temporal().stop_playback();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_playback() {
        let (app, _map) = harness("/");
        app.temporal().set_year(1800).await;
        app.temporal().toggle_play();

        app.shutdown();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(app.temporal().year(), 1800);
        assert!(!app.temporal().is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_stops_once_playing_flag_is_cleared() {
        let (app, _map) = harness("/");
        app.temporal().set_year(1800).await;
        app.temporal().toggle_play();
        tokio::time::sleep(Duration::from_millis(600)).await;
        settle().await;
        let calls = app.service().list_calls().len();

        app.state().update(|s| s.playing = false);
        tokio::time::sleep(Duration::from_secs(3)).await;
        settle().await;

        assert_eq!(app.temporal().year(), 1801);
        assert_eq!(app.service().list_calls().len(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn listener_may_stop_playback() {
        let (app, _map) = harness("/about");
        app.temporal().set_year(1800).await;

        let temporal = Arc::clone(app.temporal());
        let _subscription = app.state().subscribe(move |s| {
            if s.playing && s.current_view == View::About {
                temporal.stop_playback();
            }
        });

        app.temporal().toggle_play();
        tokio::time::sleep(Duration::from_secs(3)).await;
        settle().await;

        assert!(!app.temporal().is_playing());
        assert_eq!(app.temporal().year(), 1800);
        assert_eq!(app.service().list_calls(), [Some(1800)]);
    }
}
