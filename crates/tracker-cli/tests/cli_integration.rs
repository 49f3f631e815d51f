use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn tracker() -> Command {
    let mut cmd = Command::cargo_bin("tracker").unwrap();
    cmd.env_remove("TRACKER_FILE")
        .env_remove("TRACKER_API_URL")
        .env_remove("TRACKER_DEBUG_LOG")
        .env("TRACKER_LOG", "off");
    cmd
}

fn parse_json_output(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("Failed to parse JSON output")
}

fn issue(id: &str, status: &str, sprint: Option<&str>, ordinal: i32) -> Value {
    let mut issue = json!({
        "id": id,
        "projectId": "p1",
        "type": "TASK",
        "summary": format!("Issue {}", id),
        "status": status,
        "priority": "MEDIUM",
        "points": 1,
        "ordinal": ordinal,
        "reporterId": "u1",
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    });
    if let Some(sprint) = sprint {
        issue["sprintId"] = json!(sprint);
    }
    issue
}

fn init_board(file: &Path) {
    tracker()
        .args([
            "--file",
            file.to_str().unwrap(),
            "init",
            "--project",
            "p1",
            "--name",
            "Team board",
            "--type",
            "scrum",
            "--column",
            "To do=TODO",
            "--column",
            "In progress=IN_PROGRESS,REVIEW",
            "--column",
            "Done=DONE",
            "--sprint",
            "s1=Sprint 1",
        ])
        .assert()
        .success();
}

fn seed_issues(file: &Path, issues: Vec<Value>) {
    let mut snapshot: Value = serde_json::from_slice(&fs::read(file).unwrap()).unwrap();
    snapshot["data"]["cache"]["issues"] = Value::Array(issues);
    fs::write(file, serde_json::to_vec_pretty(&snapshot).unwrap()).unwrap();
}

fn cached_issue(file: &Path, id: &str) -> Value {
    let snapshot: Value = serde_json::from_slice(&fs::read(file).unwrap()).unwrap();
    snapshot["data"]["cache"]["issues"]
        .as_array()
        .unwrap()
        .iter()
        .find(|issue| issue["id"] == id)
        .cloned()
        .unwrap()
}

fn run(file: &Path, args: &[&str]) -> Value {
    let output = tracker()
        .arg("--file")
        .arg(file)
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    parse_json_output(&output)
}

mod init_tests {
    use super::*;

    #[test]
    fn test_init_writes_board() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);

        let snapshot: Value = serde_json::from_slice(&fs::read(&file).unwrap()).unwrap();
        assert_eq!(snapshot["version"], 1);
        assert_eq!(snapshot["data"]["projectId"], "p1");
        assert_eq!(snapshot["data"]["board"]["type"], "SCRUM");
        assert_eq!(snapshot["data"]["board"]["columns"][1]["name"], "In progress");
    }

    #[test]
    fn test_init_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);

        tracker()
            .args([
                "--file",
                file.to_str().unwrap(),
                "init",
                "--project",
                "p1",
                "--name",
                "Again",
                "--column",
                "To do=TODO",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_init_rejects_status_in_two_columns() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        tracker()
            .args([
                "--file",
                file.to_str().unwrap(),
                "init",
                "--project",
                "p1",
                "--name",
                "Broken",
                "--column",
                "To do=TODO",
                "--column",
                "Also to do=TODO",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("TODO"));
        assert!(!file.exists());
    }

    #[test]
    fn test_missing_snapshot_is_reported() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("missing.json");

        tracker()
            .args(["--file", file.to_str().unwrap(), "board"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("tracker init"));
    }
}

mod board_tests {
    use super::*;

    #[test]
    fn test_sprint_board_groups_by_column() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);
        seed_issues(
            &file,
            vec![
                issue("I1", "TODO", Some("s1"), 1),
                issue("I2", "TODO", Some("s1"), 0),
                issue("I3", "REVIEW", Some("s1"), 0),
                issue("B1", "TODO", None, 0),
            ],
        );

        let json = run(&file, &["board", "--sprint", "s1"]);
        assert!(json["success"].as_bool().unwrap());
        let data = &json["data"];
        assert_eq!(data["name"], "Sprint 1");
        assert_eq!(data["countText"], "3 issues");
        assert_eq!(data["maxColumnSize"], 2);
        assert_eq!(data["columns"][0]["issues"][0]["id"], "I2");
        assert_eq!(data["columns"][0]["issues"][1]["id"], "I1");
        assert_eq!(data["columns"][1]["issues"][0]["id"], "I3");
        assert_eq!(data["columns"][2]["issues"].as_array().unwrap().len(), 0);
        assert_eq!(data["columns"][2]["reservedSlots"], 2);
    }

    #[test]
    fn test_empty_backlog_has_no_count_text() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);

        let json = run(&file, &["board"]);
        assert_eq!(json["data"]["scope"]["kind"], "backlog");
        assert!(json["data"].get("countText").is_none());
        assert_eq!(json["data"]["columns"][0]["reservedSlots"], 1);
    }

    #[test]
    fn test_all_lists_sprint_swimlanes() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);

        let json = run(&file, &["board", "--all"]);
        assert_eq!(json["data"]["count"], 1);
        assert_eq!(json["data"]["items"][0]["scope"]["sprintId"], "s1");
    }
}

mod move_tests {
    use super::*;

    #[test]
    fn test_move_within_column_renumbers() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);
        seed_issues(
            &file,
            vec![
                issue("I1", "TODO", Some("s1"), 0),
                issue("I2", "TODO", Some("s1"), 1),
                issue("I3", "TODO", Some("s1"), 2),
            ],
        );

        let json = run(&file, &["move", "--issue", "I3", "--index", "0"]);
        let plan = &json["data"];
        assert_eq!(
            plan["patches"],
            json!([
                {"id": "I3", "ordinal": 0, "status": "TODO"},
                {"id": "I1", "ordinal": 1, "status": "TODO"},
                {"id": "I2", "ordinal": 2, "status": "TODO"}
            ])
        );
        assert_eq!(plan["steps"][0]["type"], "updateOrdinals");
        assert_eq!(plan["steps"][0]["sprintId"], "s1");

        assert_eq!(cached_issue(&file, "I3")["ordinal"], 0);
        assert_eq!(cached_issue(&file, "I2")["ordinal"], 2);
    }

    #[test]
    fn test_move_to_own_position_changes_nothing() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);
        seed_issues(
            &file,
            vec![issue("I1", "TODO", Some("s1"), 0), issue("I2", "TODO", Some("s1"), 1)],
        );
        let before = fs::read(&file).unwrap();

        let json = run(&file, &["move", "--issue", "I2", "--index", "1"]);
        assert_eq!(json["data"]["steps"], json!([]));
        assert_eq!(fs::read(&file).unwrap(), before);
    }

    #[test]
    fn test_move_out_of_sprint() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);
        seed_issues(
            &file,
            vec![
                issue("S1", "TODO", Some("s1"), 0),
                issue("S2", "TODO", Some("s1"), 1),
                issue("B1", "DONE", None, 0),
            ],
        );

        let json = run(
            &file,
            &["move", "--issue", "S1", "--backlog", "--status", "DONE", "--index", "0"],
        );
        let steps = &json["data"]["steps"];
        assert_eq!(steps[0]["type"], "sendToBacklog");
        assert_eq!(steps[0]["fromSprintId"], "s1");
        assert_eq!(steps[1]["type"], "updateOrdinals");

        let moved = cached_issue(&file, "S1");
        assert!(moved.get("sprintId").is_none());
        assert_eq!(moved["status"], "DONE");
        assert_eq!(moved["ordinal"], 0);
        assert_eq!(cached_issue(&file, "B1")["ordinal"], 1);
        assert_eq!(cached_issue(&file, "S2")["ordinal"], 0);
    }

    #[test]
    fn test_move_unknown_issue_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);

        let output = tracker()
            .args(["--file", file.to_str().unwrap(), "move", "--issue", "NOPE"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Issue not found: NOPE"))
            .get_output()
            .stderr
            .clone();

        let json = parse_json_output(&output);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["kind"], "not_found");
    }

    #[test]
    fn test_missing_snapshot_is_usage_failure() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("absent.json");

        let output = tracker()
            .args(["--file", file.to_str().unwrap(), "board"])
            .assert()
            .failure()
            .get_output()
            .stderr
            .clone();

        let json = parse_json_output(&output);
        assert_eq!(json["error"]["kind"], "usage");
        assert!(json["error"]["message"].as_str().unwrap().contains("tracker init"));
    }

    #[test]
    fn test_move_to_status_off_the_board_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);
        seed_issues(&file, vec![issue("I1", "TODO", Some("s1"), 0)]);

        tracker()
            .args([
                "--file",
                file.to_str().unwrap(),
                "move",
                "--issue",
                "I1",
                "--status",
                "ARCHIVED",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("ARCHIVED"));
        assert_eq!(cached_issue(&file, "I1")["status"], "TODO");
    }

    #[test]
    fn test_bottom_of_backlog() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);
        seed_issues(
            &file,
            vec![
                issue("B1", "TODO", None, 2),
                issue("B2", "TODO", None, 5),
                issue("S1", "TODO", Some("s1"), 0),
            ],
        );

        let json = run(&file, &["backlog", "--issue", "S1", "--bottom"]);
        assert_eq!(json["data"]["steps"][0]["edge"], "bottom");

        let moved = cached_issue(&file, "S1");
        assert!(moved["ordinal"].as_i64().unwrap() > 5);
        assert!(moved.get("sprintId").is_none());
        assert_eq!(cached_issue(&file, "B1")["ordinal"], 2);
        assert_eq!(cached_issue(&file, "B2")["ordinal"], 5);
    }

    #[test]
    fn test_backlog_requires_an_edge() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);

        tracker()
            .args(["--file", file.to_str().unwrap(), "backlog", "--issue", "B1"])
            .assert()
            .failure();
    }
}

mod sync_tests {
    use super::*;
    use mockito::Matcher;

    fn mock_catalogs(server: &mut mockito::Server) -> Vec<mockito::Mock> {
        vec![
            server
                .mock("GET", "/api/issueStatuses")
                .with_body(r#"{"result":{"issueStatuses":[{"id":"TODO","name":"To do"}]}}"#)
                .create(),
            server
                .mock("GET", "/api/issueTypes")
                .with_body(r#"{"result":{"issueTypes":[{"id":"TASK","name":"Task"}]}}"#)
                .create(),
            server
                .mock("GET", "/api/priorityTypes")
                .with_body(r#"{"result":{"priorityTypes":[{"id":"MEDIUM","name":"Medium"}]}}"#)
                .create(),
        ]
    }

    #[test]
    fn test_sync_sprint_into_snapshot() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);

        let mut server = mockito::Server::new();
        let _catalogs = mock_catalogs(&mut server);
        let body = json!({
            "status": 200,
            "message": "OK",
            "result": {
                "issues": [issue("R1", "TODO", Some("s1"), 0), issue("R2", "DONE", Some("s1"), 0)],
                "metadata": {"pagination": {"pageSize": 100, "cursor": "abc"}, "count": 12}
            }
        });
        let sprint = server
            .mock("GET", "/api/projects/p1/sprints/s1/issues")
            .match_query(Matcher::UrlEncoded("pageSize".into(), "100".into()))
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(1)
            .create();

        let json = run(
            &file,
            &["sync", "--sprint", "s1", "--api-url", &format!("{}/api/", server.url())],
        );
        sprint.assert();

        assert_eq!(json["data"]["issueCount"], 2);
        assert_eq!(json["data"]["scopes"][0]["scope"], "issues-for-sprint:s1");
        assert_eq!(json["data"]["scopes"][0]["count"], 12);
        assert_eq!(json["data"]["scopes"][0]["hasMore"], true);
        assert_eq!(cached_issue(&file, "R2")["status"], "DONE");

        let snapshot: Value = serde_json::from_slice(&fs::read(&file).unwrap()).unwrap();
        assert_eq!(
            snapshot["data"]["cache"]["catalogs"]["issueStatuses"][0]["id"],
            "TODO"
        );
    }

    #[test]
    fn test_sync_failure_reports_query_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        init_board(&file);
        seed_issues(&file, vec![issue("I1", "TODO", Some("s1"), 0)]);

        let mut server = mockito::Server::new();
        let _catalogs = mock_catalogs(&mut server);
        let _sprint = server
            .mock("GET", "/api/projects/p1/sprints/s1/issues")
            .match_query(Matcher::Any)
            .with_status(500)
            .create();

        let api_url = format!("{}/api/", server.url());
        tracker()
            .args([
                "--file",
                file.to_str().unwrap(),
                "sync",
                "--sprint",
                "s1",
                "--api-url",
                api_url.as_str(),
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("couldn't find something you wanted"))
            .stderr(predicate::str::contains(r#""kind":"server""#));

        assert_eq!(cached_issue(&file, "I1")["ordinal"], 0);
    }
}
