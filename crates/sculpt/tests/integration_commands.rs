//! Integration tests for the AgentCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use sculpt_lib::command::{execute_json, execute_json_batch};
use sculpt_lib::harness::TestHarness;

#[tokio::test]
async fn test_command_add_primitive() {
    let mut h = TestHarness::new();

    let json = r#"{"command": "add_primitive", "kind": "sphere", "position": [1.0, 0.5, -1.0]}"#;
    let resp = execute_json(&mut h, json).await.unwrap();

    assert!(resp.success);
    let id = resp.data.as_ref().unwrap()["id"].as_str().unwrap().to_string();
    assert_eq!(h.shape(&id).unwrap().name, "Sphere");
    assert_eq!(h.shape(&id).unwrap().transform.position, [1.0, 0.5, -1.0]);
}

#[tokio::test]
async fn test_command_inspect() {
    let mut h = TestHarness::new();
    h.create_cube([0.0, 0.0, 0.0]);
    h.create_cube([2.0, 0.0, 0.0]);

    let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).await.unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["shape_count"], 2);
    assert_eq!(data["tool"], "select");
    assert_eq!(data["repeat_prompt"], "hidden");
    assert!(data["last_operation"].is_null());

    let shapes = data["shapes"].as_array().unwrap();
    assert_eq!(shapes[0]["kind"], "Box");
    assert_eq!(shapes[0]["color"], "#00f2ff");
    assert_eq!(shapes[1]["triangles"], 12);
}

#[tokio::test]
async fn test_command_carve_and_repeat_workflow() {
    let mut h = TestHarness::new();

    let json = r#"[
        {"command": "look_from", "eye": [0.0, 0.0, 10.0], "target": [0.0, 0.0, 0.0]},
        {"command": "import_project", "project": {
            "version": 1,
            "name": "Slab",
            "shapes": [{"kind": "Box", "parameters": {"width": 6.0, "height": 2.0, "depth": 6.0},
                        "position": [0.0, 0.0, 0.0]}]
        }},
        {"command": "toggle_straight_lines"},
        {"command": "toggle_tool", "mode": "carve"},
        {"command": "click_at", "point": [0.4, 1.0, 1.1]},
        {"command": "repeat", "distance": 1.0},
        {"command": "repeat_many", "count": 2, "distance": 1.0},
        {"command": "inspect"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).await.unwrap();
    assert_eq!(responses.len(), 8);
    assert!(responses.iter().all(|r| r.success), "{responses:?}");

    assert_eq!(responses[5].data.as_ref().unwrap()["repeated"], true);
    let many = responses[6].data.as_ref().unwrap();
    assert_eq!(many["attempts"], 2);
    assert_eq!(many["succeeded"], 2);

    let data = responses[7].data.as_ref().unwrap();
    assert_eq!(data["shape_count"], 5);
    assert_eq!(data["tool"], "carve");
    assert_eq!(data["straight_lines"], true);
    assert_eq!(data["last_operation"]["type"], "custom_split");
    assert!(h.is_in_sync());
}

#[tokio::test]
async fn test_command_repeat_miss_is_not_a_failure() {
    let mut h = TestHarness::new();

    let json = r#"[
        {"command": "add_primitive", "kind": "cube", "position": [0.0, 0.5, 0.0]},
        {"command": "toggle_tool", "mode": "carve"},
        {"command": "pointer_down", "origin": [-10.0, 0.6, 0.3], "direction": [1.0, 0.0, 0.0]},
        {"command": "pointer_up"},
        {"command": "repeat", "distance": -30.0}
    ]"#;

    let responses = execute_json_batch(&mut h, json).await.unwrap();
    assert!(responses.iter().all(|r| r.success));
    let repeat = responses[4].data.as_ref().unwrap();
    assert_eq!(repeat["repeated"], false);
    assert_eq!(h.shape_count(), 2);
}

#[tokio::test]
async fn test_command_repeat_many_without_record_is_reported() {
    let mut h = TestHarness::new();

    let json = r#"[
        {"command": "repeat_many", "count": 3, "distance": 1.0},
        {"command": "notifications"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).await.unwrap();
    assert!(responses.iter().all(|r| r.success), "{responses:?}");
    let many = responses[0].data.as_ref().unwrap();
    assert_eq!(many["attempts"], 0);
    assert_eq!(many["reason"], "Nothing to repeat");
    let messages = responses[1].data.as_ref().unwrap()["messages"].as_array().unwrap();
    assert_eq!(messages[0], "Nothing to repeat yet. Carve or draw something first!");
}

#[tokio::test]
async fn test_command_draw_and_shapeify() {
    let mut h = TestHarness::new();

    let json = r#"[
        {"command": "toggle_tool", "mode": "draw"},
        {"command": "stroke", "points": [[0,0,0],[0.5,0.3,0.1],[1,0.8,0.4],[1.5,1.0,1.0],[2,1.5,1.2]]},
        {"command": "shapeify"},
        {"command": "show_repeat_prompt", "prompt": "equal"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).await.unwrap();
    assert!(responses.iter().all(|r| r.success));
    assert!(responses[2].data.as_ref().unwrap()["id"].is_string());
    assert_eq!(responses[3].data.as_ref().unwrap()["repeat_prompt"], "choices");
    assert_eq!(h.shape_count(), 1);
}

#[tokio::test]
async fn test_command_select_and_delete() {
    let mut h = TestHarness::new();
    let id = h.create_cube([0.0, 0.5, 0.0]);

    let json = r#"[
        {"command": "click_at", "point": [0.1, 0.5, 0.2]},
        {"command": "key_down", "key": "delete"},
        {"command": "notifications"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).await.unwrap();
    assert!(responses.iter().all(|r| r.success));
    assert!(h.shape(&id).is_none());
    let messages = responses[2].data.as_ref().unwrap()["messages"].as_array().unwrap();
    assert_eq!(messages.last().unwrap(), "Cube deleted.");
    assert!(h.notifications.messages().is_empty());
}

#[tokio::test]
async fn test_command_set_transform() {
    let mut h = TestHarness::new();
    let id = h.create_cube([0.0, 0.0, 0.0]);

    let json = format!(
        r#"{{"command": "set_transform", "id": "{id}", "transform": {{"position": [1.0, 2.0, 3.0], "rotation": [0, 0, 0], "scale": [2, 1, 1]}}}}"#
    );
    let resp = execute_json(&mut h, &json).await.unwrap();
    assert!(resp.success);
    let shape = h.shape(&id).unwrap();
    assert_eq!(shape.transform.position, [1.0, 2.0, 3.0]);
    assert_eq!(shape.transform.scale, [2.0, 1.0, 1.0]);
}

#[tokio::test]
async fn test_command_projects() {
    let mut h = TestHarness::new();
    h.create_cube([0.0, 0.0, 0.0]);

    let json = r#"[
        {"command": "save_project", "name": "Tower"},
        {"command": "new_project"},
        {"command": "list_projects"},
        {"command": "load_project", "name": "Tower"},
        {"command": "export_project"},
        {"command": "delete_project", "name": "Tower"},
        {"command": "list_projects"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).await.unwrap();
    assert!(responses.iter().all(|r| r.success), "{responses:?}");

    assert_eq!(responses[0].data.as_ref().unwrap()["project"], "Tower");
    let listed = responses[2].data.as_ref().unwrap();
    assert_eq!(listed["current"], "Untitled Project");
    assert_eq!(listed["projects"][0], "Tower");

    let exported = &responses[4].data.as_ref().unwrap()["project"];
    assert_eq!(exported["name"], "Tower");
    assert_eq!(exported["shapes"].as_array().unwrap().len(), 1);

    assert!(responses[6].data.as_ref().unwrap()["projects"].as_array().unwrap().is_empty());
    assert_eq!(h.shape_count(), 0);
}

#[tokio::test]
async fn test_command_export_stl_in_memory() {
    let mut h = TestHarness::new();
    h.create_cube([0.0, 0.0, 0.0]);
    h.create_cube([2.0, 0.0, 0.0]);

    let resp = execute_json(&mut h, r#"{"command": "export_stl"}"#).await.unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["facets"], 24);
    assert_eq!(data["bytes"], 84 + 24 * 50);
    assert!(data["path"].is_null());
}

#[tokio::test]
async fn test_command_unknown_is_rejected() {
    let mut h = TestHarness::new();
    let result = execute_json(&mut h, r#"{"command": "fly_away"}"#).await;
    assert!(result.is_err());

    let batch = execute_json_batch(&mut h, r#"[{"command": "inspect"}, {"oops": 1}]"#).await;
    assert!(batch.is_err());
}
