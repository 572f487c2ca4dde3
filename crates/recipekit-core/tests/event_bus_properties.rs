use parking_lot::Mutex;
use recipekit_core::{AppEvent, CommandSource, EventBus, EventFilter, EventKind, RecipeAction};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_handler(
    name: &'static str,
    log: &Arc<Mutex<Vec<&'static str>>>,
) -> impl Fn(&AppEvent) -> anyhow::Result<()> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |_| {
        log.lock().push(name);
        Ok(())
    }
}

#[test]
fn each_subscriber_gets_exactly_one_delivery_per_publish_in_registration_order() {
    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let _first = bus.subscribe(EventFilter::All, counting_handler("first", &log));
    let _second = bus.subscribe(EventFilter::All, counting_handler("second", &log));
    let _third = bus.subscribe(EventFilter::All, counting_handler("third", &log));

    for _ in 0..3 {
        bus.publish(AppEvent::NewRecipe {
            source: CommandSource::MenuBar,
        });
    }

    let expected: Vec<&str> = ["first", "second", "third"]
        .iter()
        .copied()
        .cycle()
        .take(9)
        .collect();
    assert_eq!(*log.lock(), expected);
}

#[test]
fn released_subscription_receives_nothing_now_or_later() {
    let bus = EventBus::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let sub = bus.on(EventKind::ToggleRecipeIsFavorite, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    sub.release();
    for _ in 0..3 {
        bus.publish(AppEvent::ToggleRecipeIsFavorite {
            source: CommandSource::Toolbar,
        });
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn double_release_is_a_noop() {
    let bus = EventBus::new();
    let sub = bus.on(EventKind::EditRecipe, |_| Ok(()));
    assert!(sub.release());
    assert!(!sub.release());
    drop(sub);
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn publish_with_no_presenter_leaves_bus_usable() {
    let bus = EventBus::new();
    assert_eq!(
        bus.publish(AppEvent::ToggleRecipeIsFavorite {
            source: CommandSource::Toolbar,
        }),
        0
    );

    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let _late = bus.on(EventKind::ToggleRecipeIsFavorite, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    bus.publish(AppEvent::ToggleRecipeIsFavorite {
        source: CommandSource::Toolbar,
    });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(bus.failure_count(), 0);
}

#[test]
fn two_surfaces_publishing_edit_are_delivered_in_publish_order() {
    let bus = EventBus::new();
    let sources = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&sources);
    let _editor = bus.on(EventKind::EditRecipe, move |event| {
        if let Some(source) = event.source() {
            s.lock().push(source);
        }
        Ok(())
    });

    bus.publish(RecipeAction::Edit.into_event(CommandSource::MenuBar));
    bus.publish(RecipeAction::Edit.into_event(CommandSource::Toolbar));

    assert_eq!(
        *sources.lock(),
        vec![CommandSource::MenuBar, CommandSource::Toolbar]
    );
}

#[test]
fn handler_publishing_from_inside_dispatch_does_not_reorder_other_subscribers() {
    let bus = Arc::new(EventBus::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    let inner_bus = Arc::clone(&bus);
    let _relay = bus.on(EventKind::NewRecipe, move |_| {
        inner_bus.publish(AppEvent::EditRecipe {
            source: CommandSource::App,
        });
        Ok(())
    });

    let l = Arc::clone(&log);
    let _observer = bus.subscribe(EventFilter::All, move |event| {
        l.lock().push(event.kind());
        Ok(())
    });

    bus.publish(AppEvent::NewRecipe {
        source: CommandSource::MenuBar,
    });

    assert_eq!(
        *log.lock(),
        vec![EventKind::NewRecipe, EventKind::EditRecipe]
    );
}
