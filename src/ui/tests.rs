use super::*;
use crate::drawer::DrawerView;
use crate::registry::{NodeCategory, NodeKind, INPUT_HANDLE, OUTPUT_HANDLE};
use crate::types::{NodeId, Position};
use eframe::egui;

fn raw_input(events: Vec<egui::Event>) -> egui::RawInput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw.events = events;
    raw
}

/// Run one canvas frame on a shared context so pointer state carries over.
fn canvas_frame(ctx: &egui::Context, app: &mut FlowBuilderApp, events: Vec<egui::Event>) {
    let _ = ctx.run(raw_input(events), |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
    });
}

fn pointer_button(pos: egui::Pos2, pressed: bool) -> egui::Event {
    egui::Event::PointerButton {
        pos,
        button: egui::PointerButton::Primary,
        pressed,
        modifiers: egui::Modifiers::NONE,
    }
}

fn key(key: egui::Key) -> egui::Event {
    egui::Event::Key {
        key,
        physical_key: Some(key),
        pressed: true,
        repeat: false,
        modifiers: egui::Modifiers::NONE,
    }
}

/// Presses at `from`, moves through `path` and releases at the last point.
fn drag(ctx: &egui::Context, app: &mut FlowBuilderApp, from: egui::Pos2, path: &[egui::Pos2]) {
    canvas_frame(ctx, app, vec![egui::Event::PointerMoved(from)]);
    canvas_frame(
        ctx,
        app,
        vec![egui::Event::PointerMoved(from), pointer_button(from, true)],
    );
    let mut last = from;
    for pos in path {
        canvas_frame(ctx, app, vec![egui::Event::PointerMoved(*pos)]);
        last = *pos;
    }
    canvas_frame(ctx, app, vec![pointer_button(last, false)]);
}

fn click(ctx: &egui::Context, app: &mut FlowBuilderApp, at: egui::Pos2) {
    drag(ctx, app, at, &[]);
}

/// An app with an empty flow open and screen space equal to world space.
fn editor_app() -> FlowBuilderApp {
    let mut app = FlowBuilderApp::default();
    app.config.show_grid = false;
    let flow = app.gallery.create_new("Canvas test").expect("create flow");
    app.open_in_editor(flow);
    app.canvas.offset = egui::Vec2::ZERO;
    app.canvas.zoom_factor = 1.0;
    app.canvas.centered = true;
    app
}

fn add_node(app: &mut FlowBuilderApp, kind: NodeKind, x: f32, y: f32) -> NodeId {
    app.session
        .as_mut()
        .expect("flow is open")
        .flow
        .graph
        .add_node(kind, Position::new(x, y))
}

fn session(app: &FlowBuilderApp) -> &EditorSession {
    app.session.as_ref().expect("flow is open")
}

#[test]
fn clicking_node_opens_its_configuration() {
    let mut app = editor_app();
    let node_id = add_node(&mut app, NodeKind::Media, 300.0, 200.0);
    let ctx = egui::Context::default();

    click(&ctx, &mut app, egui::pos2(300.0, 210.0));

    let drawer = &session(&app).drawer;
    assert!(drawer.is_open());
    assert_eq!(
        drawer.view(),
        DrawerView::Configuring {
            kind: NodeKind::Media,
            node_id
        }
    );
}

/// Presses at `from` and moves through `path` without releasing.
fn press_and_move(
    ctx: &egui::Context,
    app: &mut FlowBuilderApp,
    from: egui::Pos2,
    path: &[egui::Pos2],
) {
    canvas_frame(ctx, app, vec![egui::Event::PointerMoved(from)]);
    canvas_frame(
        ctx,
        app,
        vec![egui::Event::PointerMoved(from), pointer_button(from, true)],
    );
    for pos in path {
        canvas_frame(ctx, app, vec![egui::Event::PointerMoved(*pos)]);
    }
}

fn position_of(app: &FlowBuilderApp, node_id: NodeId) -> Position {
    session(app).flow.graph.node(node_id).expect("node kept").position
}

#[test]
fn dragging_node_moves_it_without_opening_drawer() {
    let mut app = editor_app();
    let node_id = add_node(&mut app, NodeKind::Text, 300.0, 200.0);
    let ctx = egui::Context::default();

    press_and_move(
        &ctx,
        &mut app,
        egui::pos2(300.0, 210.0),
        &[egui::pos2(340.0, 240.0), egui::pos2(400.0, 260.0)],
    );
    // the graph is untouched while the button is held
    assert_eq!(position_of(&app, node_id), Position::new(300.0, 200.0));
    assert_eq!(app.interaction.drag_preview, Some(Position::new(400.0, 250.0)));
    assert!(!session(&app).dirty);

    canvas_frame(&ctx, &mut app, vec![pointer_button(egui::pos2(400.0, 260.0), false)]);

    assert_eq!(position_of(&app, node_id), Position::new(400.0, 250.0));
    assert!(app.interaction.drag_preview.is_none());
    let session = session(&app);
    assert!(!session.drawer.is_open());
    assert!(session.dirty);
}

#[test]
fn escape_cancels_node_drag() {
    let mut app = editor_app();
    let node_id = add_node(&mut app, NodeKind::Text, 300.0, 200.0);
    let ctx = egui::Context::default();

    press_and_move(&ctx, &mut app, egui::pos2(300.0, 210.0), &[egui::pos2(400.0, 260.0)]);
    canvas_frame(&ctx, &mut app, vec![key(egui::Key::Escape)]);
    assert!(app.interaction.dragging_node.is_none());
    assert!(app.interaction.drag_preview.is_none());

    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(450.0, 300.0))]);
    canvas_frame(&ctx, &mut app, vec![pointer_button(egui::pos2(450.0, 300.0), false)]);

    assert_eq!(position_of(&app, node_id), Position::new(300.0, 200.0));
    let session = session(&app);
    assert!(!session.drawer.is_open());
    assert!(!session.dirty);
}

#[test]
fn dragging_from_output_handle_onto_node_connects() {
    let mut app = editor_app();
    let a = add_node(&mut app, NodeKind::Text, 300.0, 200.0);
    let b = add_node(&mut app, NodeKind::Text, 700.0, 200.0);
    let ctx = egui::Context::default();

    // Text nodes have one output handle, centred on the right edge.
    drag(
        &ctx,
        &mut app,
        egui::pos2(390.0, 200.0),
        &[egui::pos2(500.0, 205.0), egui::pos2(660.0, 210.0)],
    );

    let graph = &session(&app).flow.graph;
    let edge = graph.edge_from(a, OUTPUT_HANDLE).expect("edge created");
    assert_eq!(edge.target, b);
    assert_eq!(edge.target_handle, INPUT_HANDLE);
    assert!(app.interaction.pending_connection.is_none());
}

#[test]
fn releasing_connection_on_empty_canvas_creates_nothing() {
    let mut app = editor_app();
    add_node(&mut app, NodeKind::Text, 300.0, 200.0);
    add_node(&mut app, NodeKind::Text, 700.0, 200.0);
    let ctx = egui::Context::default();

    drag(
        &ctx,
        &mut app,
        egui::pos2(390.0, 200.0),
        &[egui::pos2(500.0, 500.0), egui::pos2(520.0, 600.0)],
    );

    assert!(session(&app).flow.graph.edges().is_empty());
    assert!(app.interaction.pending_connection.is_none());
}

#[test]
fn escape_cancels_connection_drag() {
    let mut app = editor_app();
    add_node(&mut app, NodeKind::Text, 300.0, 200.0);
    add_node(&mut app, NodeKind::Text, 700.0, 200.0);
    let ctx = egui::Context::default();
    let handle = egui::pos2(390.0, 200.0);

    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(handle)]);
    canvas_frame(
        &ctx,
        &mut app,
        vec![egui::Event::PointerMoved(handle), pointer_button(handle, true)],
    );
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(500.0, 400.0))]);
    assert!(app.interaction.pending_connection.is_some());

    canvas_frame(&ctx, &mut app, vec![key(egui::Key::Escape)]);
    assert!(app.interaction.pending_connection.is_none());

    // releasing over the other node afterwards must not resurrect the drag
    canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(egui::pos2(660.0, 200.0))]);
    canvas_frame(&ctx, &mut app, vec![pointer_button(egui::pos2(660.0, 200.0), false)]);
    assert!(session(&app).flow.graph.edges().is_empty());
}

#[test]
fn options_handles_connect_to_different_targets() {
    let mut app = editor_app();
    let question = add_node(&mut app, NodeKind::Options, 300.0, 200.0);
    let yes = add_node(&mut app, NodeKind::Text, 700.0, 100.0);
    let no = add_node(&mut app, NodeKind::Text, 700.0, 320.0);
    let ctx = egui::Context::default();

    // Two options spread the handles at thirds of the 90-unit height.
    let rect = egui::Rect::from_center_size(egui::pos2(300.0, 200.0), egui::vec2(180.0, 90.0));
    let first = egui::pos2(rect.right(), rect.top() + 30.0);
    let second = egui::pos2(rect.right(), rect.top() + 60.0);

    drag(&ctx, &mut app, first, &[egui::pos2(700.0, 110.0)]);
    drag(&ctx, &mut app, second, &[egui::pos2(700.0, 330.0)]);

    let graph = &session(&app).flow.graph;
    assert_eq!(graph.edge_from(question, "option-0").map(|e| e.target), Some(yes));
    assert_eq!(graph.edge_from(question, "option-1").map(|e| e.target), Some(no));
}

#[test]
fn crowded_options_node_connects_from_the_pressed_handle() {
    let mut app = editor_app();
    let question = add_node(&mut app, NodeKind::Options, 300.0, 200.0);
    let target = add_node(&mut app, NodeKind::Text, 700.0, 236.0);
    {
        let labels: Vec<String> = (1..=8).map(|i| format!("Choice {i}")).collect();
        let graph = &mut app.session.as_mut().expect("flow is open").flow.graph;
        graph.update_node_data(
            question,
            serde_json::json!({ "options": labels })
                .as_object()
                .expect("object")
                .clone(),
        );
    }
    let ctx = egui::Context::default();

    // eight handles stretch the node to 9 * 24 units, so option-5 sits at
    // top (92) + 6 * 24
    let handle = egui::pos2(390.0, 236.0);
    assert_eq!(
        app.hit_test(handle),
        Some(CanvasHit::OutputHandle(question, "option-5".into()))
    );
    assert_eq!(
        app.hit_test(egui::pos2(390.0, 215.0)),
        Some(CanvasHit::OutputHandle(question, "option-4".into()))
    );

    drag(&ctx, &mut app, handle, &[egui::pos2(550.0, 236.0), egui::pos2(700.0, 236.0)]);

    let graph = &session(&app).flow.graph;
    assert_eq!(graph.edge_from(question, "option-5").map(|e| e.target), Some(target));
    assert_eq!(graph.edges().len(), 1);
}

#[test]
fn delete_button_removes_node_and_leaves_configuration() {
    let mut app = editor_app();
    let a = add_node(&mut app, NodeKind::Whatsapp, 300.0, 200.0);
    let b = add_node(&mut app, NodeKind::Text, 700.0, 200.0);
    {
        let session = app.session.as_mut().expect("flow is open");
        session
            .flow
            .graph
            .connect(a, OUTPUT_HANDLE, b, INPUT_HANDLE)
            .expect("connect");
    }
    app.on_node_click(a);
    let ctx = egui::Context::default();

    // delete button sits in the node's top-right corner
    click(&ctx, &mut app, egui::pos2(379.0, 166.0));

    let session = session(&app);
    assert!(!session.flow.graph.contains_node(a));
    assert!(session.flow.graph.edges().is_empty());
    assert_eq!(session.drawer.view(), DrawerView::Menu(NodeCategory::Channels));
}

#[test]
fn delete_key_removes_configured_node() {
    let mut app = editor_app();
    let a = add_node(&mut app, NodeKind::RunCode, 300.0, 200.0);
    app.on_node_click(a);
    let ctx = egui::Context::default();

    canvas_frame(&ctx, &mut app, vec![key(egui::Key::Delete)]);

    let session = session(&app);
    assert!(session.flow.graph.is_empty());
    assert_eq!(session.drawer.view(), DrawerView::Menu(NodeCategory::Core));
}

#[test]
fn backspace_leaves_configured_node_alone() {
    let mut app = editor_app();
    let a = add_node(&mut app, NodeKind::Text, 300.0, 200.0);
    app.on_node_click(a);
    let ctx = egui::Context::default();

    canvas_frame(&ctx, &mut app, vec![key(egui::Key::Backspace)]);

    let session = session(&app);
    assert!(session.flow.graph.contains_node(a));
    assert_eq!(session.drawer.selected_node_id(), Some(a));
}

#[test]
fn drawing_canvas_with_node_produces_shapes() {
    let mut app = editor_app();
    add_node(&mut app, NodeKind::AiAgent, 50.0, 50.0);

    let ctx = egui::Context::default();
    let out = ctx.run(raw_input(Vec::new()), |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
    });

    assert!(!out.shapes.is_empty(), "expected some shapes to be painted");
}

#[test]
fn first_frame_centres_the_flow() {
    let mut app = editor_app();
    add_node(&mut app, NodeKind::Text, 1000.0, 1000.0);
    app.canvas.centered = false;
    let ctx = egui::Context::default();

    canvas_frame(&ctx, &mut app, Vec::new());

    assert!(app.canvas.centered);
    let screen = app.world_to_screen(egui::pos2(1000.0, 1000.0));
    assert!(screen.x > 0.0 && screen.x < 1200.0);
    assert!(screen.y > 0.0 && screen.y < 800.0);
}

#[test]
fn drawer_panel_renders_every_view() {
    let mut app = editor_app();
    let options = add_node(&mut app, NodeKind::Options, 100.0, 100.0);
    let ctx = egui::Context::default();

    let render = |app: &mut FlowBuilderApp| {
        let _ = ctx.run(raw_input(Vec::new()), |ctx| app.draw_drawer_panel(ctx));
    };

    app.open_drawer_at(None);
    render(&mut app);
    app.session.as_mut().expect("open").drawer.choose_menu(NodeCategory::Ai);
    render(&mut app);
    app.on_node_click(options);
    render(&mut app);

    assert_eq!(session(&app).drawer.selected_node_id(), Some(options));
}

#[test]
fn closing_editor_saves_changes_to_gallery() {
    let mut app = editor_app();
    add_node(&mut app, NodeKind::Text, 0.0, 0.0);
    add_node(&mut app, NodeKind::Media, 200.0, 0.0);
    let id = session(&app).flow.id;
    app.session.as_mut().expect("open").dirty = true;

    app.close_editor();

    assert!(app.session.is_none());
    let stored = app.gallery.open_flow(id).expect("stored");
    assert_eq!(stored.node_count, 2);
    assert_eq!(app.gallery_screen.flows[0].id, id);
}

#[test]
fn gallery_delete_waits_for_confirmation() {
    let mut app = FlowBuilderApp::default();
    let flow = app.gallery.create_new("Keep me?").expect("create");
    app.refresh_flow_list();
    app.gallery_screen.pending_delete = Some(app.gallery.request_delete(flow.id).expect("request"));

    let ctx = egui::Context::default();
    let _ = ctx.run(raw_input(Vec::new()), |ctx| app.draw_delete_confirmation(ctx));

    assert!(app.gallery.exists(flow.id).expect("exists"));
    assert!(app.gallery_screen.pending_delete.is_some());
}

#[test]
fn imported_file_lands_in_gallery() {
    let mut app = FlowBuilderApp::default();
    let template = app.gallery.use_template("template-support").expect("template");
    let json = template.to_json().expect("json");

    app.handle_file_result(FileOperationResult::ImportLoaded("support.json".into(), json));
    assert_eq!(app.gallery_screen.flows.len(), 2);

    app.handle_file_result(FileOperationResult::ImportLoaded("junk.json".into(), "nope".into()));
    assert_eq!(app.gallery_screen.flows.len(), 2);
    assert!(app
        .status
        .as_deref()
        .is_some_and(|s| s.contains("junk.json")));
}

#[test]
fn settings_round_trip_through_storage_format() {
    let mut app = FlowBuilderApp::default();
    app.config.dark_mode = false;
    app.config.show_grid = false;

    let json = serde_json::to_string(&app.config).expect("serialize");
    let restored: crate::config::EditorConfig = serde_json::from_str(&json).expect("parse");
    assert_eq!(restored, app.config);
}
