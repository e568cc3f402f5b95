//! Widget removal through the running app: single widgets, large sibling
//! sets, whole branches, overlapping selections, and focus re-targeting.

use std::collections::HashSet;

use rstest::rstest;
use tokio::sync::broadcast::error::TryRecvError;

use widgetdom::application::{ApplicationError, LifecycleEvent};
use widgetdom::domain::{release_tree, DomError, TreeRender};
use widgetdom::util::testing;
use widgetdom::{App, Widget, WidgetKind};

/// A chain of five single-child containers ending in a `Static`.
fn branch() -> Widget {
    (0..5).fold(Widget::text("leaf"), |inner, _| Widget::container([inner]))
}

/// Two branches around one `Static`: 13 widgets below the screen.
fn two_branches() -> Vec<Widget> {
    vec![branch(), Widget::text("middle"), branch()]
}

// ============================================================
// Sibling removal
// ============================================================

#[tokio::test]
async fn given_single_widget_when_removed_then_screen_is_empty() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();

    app.mount([Widget::text("only")]).await.unwrap();
    assert_eq!(app.screen_children().len(), 1);

    let only = app.query_one("Static").unwrap();
    app.remove_node(only).await.unwrap();

    assert_eq!(app.screen_children().len(), 0);
}

#[rstest]
#[case(1)]
#[case(1000)]
#[tokio::test]
async fn given_many_widgets_when_all_removed_then_screen_is_empty(#[case] count: usize) {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();

    app.mount((0..count).map(|n| Widget::text(n.to_string())))
        .await
        .unwrap();
    assert_eq!(app.screen_children().len(), count);

    let report = app.query("Static").unwrap().remove().await.unwrap();

    assert_eq!(report.len(), count);
    assert_eq!(app.screen_children().len(), 0);
}

#[tokio::test]
async fn given_widgets_split_by_id_when_one_half_removed_then_other_half_remains() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();

    app.mount((0..1000).map(|n| Widget::text(n.to_string()).with_id(format!("is-{}", n % 2))))
        .await
        .unwrap();
    assert_eq!(app.screen_children().len(), 1000);

    app.query("#is-0").unwrap().remove().await.unwrap();

    let remaining = app.screen_children();
    assert_eq!(remaining.len(), 500);
    assert!(remaining
        .iter()
        .all(|&id| app.node(id).and_then(|d| d.id).as_deref() == Some("is-1")));
}

#[tokio::test]
async fn given_unawaited_removal_when_settled_then_tree_updated() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    app.mount([Widget::text("a"), Widget::text("b")]).await.unwrap();

    let handle = app.query("Static").unwrap().remove();
    drop(handle);
    pilot.pause().await.unwrap();

    assert!(app.screen_children().is_empty());
}

// ============================================================
// Branch and overlap removal
// ============================================================

#[tokio::test]
async fn given_two_branches_when_first_branch_removed_then_seven_widgets_remain() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();

    app.mount(two_branches()).await.unwrap();
    assert_eq!(app.walk_children(app.screen(), false).len(), 13);

    let first = app.screen_children()[0];
    let report = app.remove_node(first).await.unwrap();

    assert_eq!(report.len(), 6);
    assert_eq!(app.walk_children(app.screen(), false).len(), 7);
    assert!(!app.contains(first));
}

#[tokio::test]
async fn given_very_deep_chain_when_measured_and_removed_then_completes() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    let mut parent = app.screen();
    for _ in 0..100_000 {
        parent = app
            .mount_into(parent, [Widget::container(Vec::<Widget>::new())])
            .await
            .unwrap()[0];
    }

    assert_eq!(app.with_dom(|dom| dom.depth()), 100_001);
    let top_level = app.with_dom(|dom| {
        let tree = dom.to_tree_string(None);
        let count = tree.leaves.len();
        release_tree(tree);
        count
    });
    assert_eq!(top_level, 1);

    let top = app.screen_children()[0];
    let report = app.remove_node(top).await.unwrap();

    assert_eq!(report.len(), 100_000);
    assert!(app.screen_children().is_empty());
}

#[tokio::test]
async fn given_overlapping_containers_when_removed_then_only_middle_static_remains() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    let mut events = app.subscribe();

    app.mount(two_branches()).await.unwrap();
    assert_eq!(app.walk_children(app.screen(), false).len(), 13);
    while events.try_recv().is_ok() {}

    let containers = app.query("Container").unwrap();
    assert_eq!(containers.len(), 10);
    let report = containers.remove().await.unwrap();

    let survivors = app.walk_children(app.screen(), false);
    assert_eq!(survivors.len(), 1);
    assert_eq!(
        app.node(survivors[0]).and_then(|d| d.label).as_deref(),
        Some("middle")
    );

    // Every node is unmounted exactly once.
    let mut unmounted = Vec::new();
    loop {
        match events.try_recv() {
            Ok(LifecycleEvent::Unmounted { node, .. }) => unmounted.push(node),
            Ok(_) => {}
            Err(TryRecvError::Empty) => break,
            Err(e) => panic!("unexpected receive error: {}", e),
        }
    }
    assert_eq!(unmounted.len(), 12);
    assert_eq!(unmounted.iter().collect::<HashSet<_>>().len(), 12);
    assert_eq!(report.removed, unmounted);
}

#[tokio::test]
async fn given_removed_node_when_removed_again_then_no_op() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    app.mount(two_branches()).await.unwrap();
    let first = app.screen_children()[0];

    app.remove_node(first).await.unwrap();
    let again = app.remove_node(first).await.unwrap();

    assert!(again.is_empty());
    assert_eq!(again.skipped, 1);
    assert_eq!(app.walk_children(app.screen(), false).len(), 7);
}

#[tokio::test]
async fn given_screen_in_batch_when_removing_then_fails_and_removes_nothing() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    app.mount(two_branches()).await.unwrap();
    let first = app.screen_children()[0];

    let result = app.remove([first, app.screen()]).await;

    assert_eq!(
        result.unwrap_err(),
        ApplicationError::Domain(DomError::CannotRemoveScreen)
    );
    assert_eq!(app.walk_children(app.screen(), false).len(), 13);
}

#[tokio::test]
async fn given_screen_blueprint_in_batch_when_mounting_then_fails_and_mounts_nothing() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    app.mount(two_branches()).await.unwrap();

    let result = app
        .mount([
            Widget::text("before"),
            Widget::container([Widget::new(WidgetKind::Screen)]),
        ])
        .await;

    assert_eq!(
        result.unwrap_err(),
        ApplicationError::Domain(DomError::CannotMountScreen)
    );
    assert_eq!(app.walk_children(app.screen(), false).len(), 13);
    assert!(app.query("Screen").unwrap().is_empty());
    assert_eq!(app.render().matches("Screen").count(), 1);
}

#[tokio::test]
async fn given_cancelled_removal_when_worker_runs_then_tree_untouched() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    app.mount(two_branches()).await.unwrap();

    let handle = app.query("Container").unwrap().remove();
    handle.cancel();

    assert_eq!(handle.await.unwrap_err(), ApplicationError::Cancelled);
    assert_eq!(app.walk_children(app.screen(), false).len(), 13);
}

#[tokio::test]
async fn given_removed_parent_when_mounting_into_it_then_node_not_found() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    let roots = app.mount([Widget::container(Vec::<Widget>::new())]).await.unwrap();
    app.remove(roots.clone()).await.unwrap();

    let result = app.mount_into(roots[0], [Widget::text("late")]).await;

    assert_eq!(
        result.unwrap_err(),
        ApplicationError::Domain(DomError::NodeNotFound(roots[0]))
    );
}

// ============================================================
// Focus after removal
// ============================================================

#[tokio::test]
async fn given_focused_button_when_its_container_removed_then_focus_moves_to_last_button() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();

    let buttons: Vec<Widget> = (0..10).map(|n| Widget::button(n.to_string())).collect();
    app.mount([
        Widget::container(buttons[..5].to_vec()),
        Widget::container(buttons[5..].to_vec()),
    ])
    .await
    .unwrap();
    let mounted = app.query("Button").unwrap();
    assert_eq!(mounted.len(), 10);
    assert_eq!(app.screen_children().len(), 2);
    assert_eq!(app.walk_children(app.screen(), false).len(), 12);
    assert_eq!(app.focused(), None);

    pilot.press(&["tab"]).await.unwrap();
    assert_eq!(app.focused(), mounted.first());

    let first_container = app.screen_children()[0];
    app.remove_node(first_container).await.unwrap();

    assert_eq!(app.screen_children().len(), 1);
    assert_eq!(app.walk_children(app.screen(), false).len(), 6);
    assert_eq!(app.focused(), mounted.last());
}

#[tokio::test]
async fn given_focus_elsewhere_when_branch_removed_then_focus_unchanged() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    app.mount([
        Widget::container([Widget::button("a")]),
        Widget::container([Widget::button("b")]),
    ])
    .await
    .unwrap();
    pilot.press(&["tab"]).await.unwrap();
    let focused = app.focused();

    let second = app.screen_children()[1];
    app.remove_node(second).await.unwrap();

    assert_eq!(app.focused(), focused);
}

#[tokio::test]
async fn given_last_focusable_removed_when_settled_then_unfocused() {
    testing::init_test_setup();
    let pilot = App::run_test();
    let app = pilot.app();
    app.mount([Widget::button("only"), Widget::text("label")])
        .await
        .unwrap();
    pilot.press(&["tab"]).await.unwrap();
    assert!(app.focused().is_some());

    app.query("Button").unwrap().remove().await.unwrap();

    assert_eq!(app.focused(), None);
}
