use cascade_grid::{
    AnsiRenderer, ConfigError, EventBuffer, GridContainer, GridError, GridEvent, GridOptions,
    GridPos, GridSize, Logger, MemorySink, PixelPos, Pointer, PointerEvent, Viewport,
    WidgetOptions,
};
use serde_json::json;

fn options(cascade: &str) -> GridOptions {
    GridOptions {
        cascade: Some(cascade.to_string()),
        col_width: Some(100.0),
        row_height: Some(100.0),
        margins: Some(vec![0.0]),
        min_width: Some(10.0),
        min_height: Some(10.0),
        ..GridOptions::default()
    }
}

fn container(options: GridOptions) -> (GridContainer, EventBuffer) {
    let events = EventBuffer::new();
    let grid = GridContainer::new(options, Viewport::new(600.0, 400.0))
        .unwrap()
        .with_sink(events.clone());
    (grid, events)
}

fn assert_no_overlap(grid: &GridContainer) {
    let widgets: Vec<_> = grid.widgets().collect();
    for (i, a) in widgets.iter().enumerate() {
        for b in &widgets[i + 1..] {
            assert!(
                !a.rect().intersects(&b.rect()),
                "{} and {} overlap",
                a.id(),
                b.id()
            );
        }
    }
}

#[test]
fn simple_pack_stacks_second_widget_below_first() {
    let (mut grid, _) = container(options("up"));
    grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    grid.add_item("b", &WidgetOptions::at(1, 1, 1, 1)).unwrap();

    assert_eq!(grid.item_position("a").unwrap(), GridPos::new(1, 1));
    assert_eq!(grid.item_position("b").unwrap(), GridPos::new(1, 2));
    assert_eq!(grid.map().get(1, 2), Some(&"b".to_string()));
}

#[test]
fn bounds_clamp_moves_overflowing_widget_to_first_column() {
    let mut opts = options("up");
    opts.max_cols = Some(3.0);
    let (mut grid, _) = container(opts);
    grid.add_item("wide", &WidgetOptions::at(2, 1, 3, 1)).unwrap();

    let pos = grid.item_position("wide").unwrap();
    assert_eq!(pos, GridPos::new(1, 1));
    assert!(grid.config().bounds().within(pos, GridSize::new(3, 1)));
}

#[test]
fn conflicting_min_max_keeps_max() {
    let (mut grid, _) = container(options("up"));
    let item = WidgetOptions {
        min_cols: Some(5.0),
        max_cols: Some(3.0),
        ..WidgetOptions::at(1, 1, 6, 1)
    };
    grid.add_item("a", &item).unwrap();

    let widget = grid.widget("a").unwrap();
    assert_eq!(widget.constraints().min_cols, 0);
    assert_eq!(widget.constraints().max_cols, 3);
    assert_eq!(widget.size(), GridSize::new(3, 1));
}

#[test]
fn dragging_onto_neighbour_with_left_cascade_swaps_them() {
    let (mut grid, events) = container(options("left"));
    grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    grid.add_item("b", &WidgetOptions::at(2, 1, 1, 1)).unwrap();
    events.take();

    grid.handle_pointer(PointerEvent::Down(Pointer::at(50.0, 50.0))).unwrap();
    grid.handle_pointer(PointerEvent::Move(Pointer::at(150.0, 50.0))).unwrap();
    assert!(events
        .events()
        .iter()
        .any(|e| matches!(e, GridEvent::Cascaded(w) if w.id == "b")));
    grid.handle_pointer(PointerEvent::Up(Pointer::at(150.0, 50.0))).unwrap();

    assert_eq!(grid.item_position("a").unwrap(), GridPos::new(2, 1));
    assert_eq!(grid.item_position("b").unwrap(), GridPos::new(1, 1));
    assert_eq!(grid.len(), 2);
    assert_no_overlap(&grid);
}

#[test]
fn removing_a_widget_compacts_the_rest() {
    let (mut grid, events) = container(options("up"));
    grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    grid.add_item("b", &WidgetOptions::at(1, 2, 1, 1)).unwrap();
    events.take();

    grid.remove_item("a").unwrap();
    assert_eq!(grid.item_position("b").unwrap(), GridPos::new(1, 1));
    assert_eq!(grid.map().get(1, 2), None);
    assert_eq!(events.kinds(), vec!["item_removed", "cascaded", "items_changed"]);
}

#[test]
fn prefer_new_keeps_requested_cell_and_displaces_occupant() {
    let mut opts = options("up");
    opts.prefer_new = Some(true);
    let (mut grid, events) = container(opts);
    grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    events.take();

    grid.add_item("b", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    assert_eq!(grid.item_position("b").unwrap(), GridPos::new(1, 1));
    assert_eq!(grid.item_position("a").unwrap(), GridPos::new(1, 2));
    assert_eq!(events.kinds(), vec!["cascaded", "item_added", "items_changed"]);
}

#[test]
fn update_widget_reseats_and_repacks() {
    let (mut grid, events) = container(options("up"));
    grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    events.take();

    let event = grid
        .update_widget("a", &WidgetOptions::at(2, 4, 2, 1))
        .unwrap();
    assert_eq!((event.col, event.row, event.sizex), (2, 1, 2));
    assert_eq!(grid.map().get(3, 1), Some(&"a".to_string()));
    assert_eq!(grid.map().get(1, 1), None);
    assert!(events.kinds().contains(&"item_changed"));
}

#[test]
fn shrinking_max_cols_refits_widgets() {
    let mut opts = options("up");
    opts.max_cols = Some(6.0);
    let (mut grid, _) = container(opts.clone());
    grid.add_item("a", &WidgetOptions::at(4, 1, 3, 1)).unwrap();
    assert_eq!(grid.item_position("a").unwrap(), GridPos::new(4, 1));

    opts.max_cols = Some(4.0);
    grid.set_options(opts).unwrap();
    assert_eq!(grid.config().max_cols, 4);
    assert_eq!(grid.item_position("a").unwrap(), GridPos::new(1, 1));
    assert_eq!(grid.map().get(3, 1), Some(&"a".to_string()));
    assert_eq!(grid.map().get(4, 1), None);
}

#[test]
fn viewport_resize_follows_screen_limit() {
    let mut opts = options("up");
    opts.limit_to_screen = Some(true);
    let (mut grid, _) = container(opts);
    assert_eq!(grid.config().max_cols, 6);
    grid.add_item("a", &WidgetOptions::at(5, 1, 2, 1)).unwrap();
    assert_eq!(grid.item_position("a").unwrap(), GridPos::new(5, 1));

    grid.resize_viewport(Viewport::new(400.0, 400.0)).unwrap();
    assert_eq!(grid.config().max_cols, 4);
    let widget = grid.widget("a").unwrap();
    assert!(grid.config().bounds().within(widget.position(), widget.size()));
}

#[test]
fn configuration_is_rejected_mid_gesture() {
    let (mut grid, _) = container(options("up"));
    grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    grid.drag_start("a", Pointer::at(50.0, 50.0)).unwrap();

    let err = grid.set_options(options("left")).unwrap_err();
    assert!(matches!(err, GridError::GestureInProgress));
    grid.drag_stop().unwrap();
    grid.set_options(options("left")).unwrap();
}

#[test]
fn runtime_toggles_survive_unrelated_option_changes() {
    let (mut grid, _) = container(options("up"));
    grid.disable_drag();
    grid.resize_viewport(Viewport::new(500.0, 400.0)).unwrap();
    let mut opts = options("up");
    opts.max_cols = Some(4.0);
    grid.set_options(opts.clone()).unwrap();
    assert!(!grid.drag_enabled());
    assert!(grid.resize_enabled());

    opts.resizable = Some(false);
    grid.set_options(opts.clone()).unwrap();
    assert!(!grid.resize_enabled());
    grid.enable_resize();
    grid.set_options(opts).unwrap();
    assert!(grid.resize_enabled());
}

#[test]
fn hit_box_is_shifted_by_the_leading_margins() {
    let mut opts = options("up");
    opts.margins = Some(vec![10.0]);
    let (mut grid, _) = container(opts);
    grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();

    let pixel = grid.widget("a").unwrap().pixel_rect();
    let hit = |left: f64, top: f64| {
        grid.widget_at(PixelPos::new(left, top))
            .map(|w| w.id().clone())
    };
    assert_eq!(hit(pixel.right() + 5.0, pixel.bottom() + 5.0).as_deref(), Some("a"));
    assert_eq!(hit(pixel.left + 5.0, pixel.top + 5.0), None);
    assert_eq!(hit(pixel.right() + 15.0, pixel.top + 50.0), None);
}

#[test]
fn lookups_and_duplicates_report_errors() {
    let (mut grid, _) = container(options("up"));
    grid.add_item("a", &WidgetOptions::default()).unwrap();

    assert!(matches!(
        grid.add_item("a", &WidgetOptions::default()).unwrap_err(),
        GridError::DuplicateWidget(ref id) if id == "a"
    ));
    assert!(matches!(
        grid.remove_item("zz").unwrap_err(),
        GridError::WidgetNotFound(ref id) if id == "zz"
    ));
    assert!(matches!(
        grid.cascade_at(Some(GridPos::new(1, 1)), None).unwrap_err(),
        GridError::CascadeWithoutSize
    ));
}

#[test]
fn unknown_cascade_and_options_fail_to_parse() {
    let err = GridContainer::new(options("diagonal"), Viewport::new(600.0, 400.0)).unwrap_err();
    assert!(matches!(
        err,
        GridError::Config(ConfigError::UnknownCascade(ref value)) if value == "diagonal"
    ));

    assert!(GridOptions::from_json(r#"{ "max_colz": 3 }"#).is_err());
    let parsed = GridOptions::from_json(r#"{ "max_cols": 4, "cascade": "left" }"#).unwrap();
    assert_eq!(parsed.max_cols, Some(4.0));
    assert_eq!(parsed.cascade.as_deref(), Some("left"));
}

#[test]
fn extent_tracks_lowest_occupied_row() {
    let (mut grid, _) = container(options("up"));
    grid.add_item("a", &WidgetOptions::at(1, 1, 2, 3)).unwrap();
    assert_eq!(grid.extent().cols, 2);
    assert_eq!(grid.extent().rows, 3);
    assert_eq!(grid.content_height_px(), 300.0);
}

#[test]
fn cascade_preview_is_reported_without_mutation() {
    let (mut grid, events) = container(options("up"));
    grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    grid.add_item("b", &WidgetOptions::at(1, 2, 1, 1)).unwrap();
    grid.drag_start("a", Pointer::at(50.0, 50.0)).unwrap();
    events.take();

    let moves = grid.cascade_placeholder().unwrap();
    assert!(moves.is_empty());
    assert_eq!(grid.item_position("b").unwrap(), GridPos::new(1, 2));
    assert_eq!(events.kinds(), vec!["cascade_preview"]);
}

#[test]
fn container_logs_lifecycle_and_debug_steps() {
    let sink = MemorySink::new();
    let (grid, _) = container(options("up"));
    let mut grid = grid.with_logger(Logger::new(sink.clone()));

    grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    grid.add_item("b", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
    assert_eq!(sink.messages(), vec!["item_added", "item_added"]);

    let mut opts = options("up");
    opts.debug = Some(true);
    grid.set_options(opts).unwrap();
    grid.remove_item("a").unwrap();
    assert_eq!(
        sink.messages(),
        vec![
            "item_added",
            "item_added",
            "config_applied",
            "item_removed",
            "cascade_moved"
        ]
    );
    let added = &sink.events()[0];
    assert_eq!(added.field("id"), Some(&json!("a")));

    let snapshot = grid.metrics_snapshot();
    assert_eq!(snapshot.items_added, 2);
    assert_eq!(snapshot.items_removed, 1);
    assert_eq!(snapshot.cascade_moves, 1);
    assert_eq!(snapshot.config_changes, 1);

    grid.log_metrics();
    assert_eq!(sink.messages().last().map(String::as_str), Some("grid_metrics"));
}

#[test]
fn dirty_widgets_render_as_labelled_boxes() {
    let opts = GridOptions {
        col_width: Some(10.0),
        row_height: Some(4.0),
        margins: Some(vec![0.0]),
        min_width: Some(1.0),
        min_height: Some(1.0),
        ..GridOptions::default()
    };
    let (mut grid, _) = container(opts);
    let item = WidgetOptions::at(1, 1, 1, 1).with_payload(json!({ "title": "Sales" }));
    grid.add_item("sales", &item).unwrap();

    let dirty = grid.take_dirty();
    assert_eq!(dirty.len(), 1);
    assert!(grid.take_dirty().is_empty());

    let mut output = Vec::new();
    AnsiRenderer::with_default()
        .render_frame(&mut output, &dirty)
        .unwrap();
    let rendered = String::from_utf8(output).unwrap();
    assert!(rendered.contains("│Sales   │"));
}
