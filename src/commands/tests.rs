//! Tests for command handlers over an in-memory SQLite store

use super::*;
use crate::{
    accounts::Session,
    assistant::testing::FakeGenerator,
    cli::types::{BackendKind, CountEntry, Week},
    config::{Config, ACCOUNTS_SHEET, SCORE_SHEET},
    scoring::{MergeMode, ReconcileOutcome, ScoreSheet},
    storage::{CellValue, SqliteStore, TableStore},
    ScoreError,
};
use chrono::NaiveDate;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    ctx: CommandContext<SqliteStore>,
    dir: TempDir,
}

impl Fixture {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config::from_lookup(Some(BackendKind::Sqlite), |_| None).unwrap();
        let store = SqliteStore::new_in_memory().unwrap();
        let ctx = CommandContext::new(config, store, dir.path().to_path_buf());

        let accounts: Vec<Vec<CellValue>> = [
            ["Username", "Password", "Quyen", "LopPhuTrach", "TenGiaoVien"],
            ["gv01", "secret", "User", "10A1", "Cô Lan"],
            ["admin", "root", "Admin", "", "Ban Giám Đốc"],
        ]
        .iter()
        .map(|row| row.iter().map(|c| CellValue::from(*c)).collect())
        .collect();
        ctx.store
            .write_rows(ACCOUNTS_SHEET, 1, &accounts)
            .await
            .unwrap();
        scores::init_sheet(&ctx).await.unwrap();

        Self { ctx, dir }
    }

    async fn login(&self, username: &str, password: &str) -> Session {
        auth::login(&self.ctx, username, password).await.unwrap()
    }

    fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

fn counts(entries: &[&str]) -> Vec<CountEntry> {
    entries.iter().map(|e| e.parse().unwrap()).collect()
}

fn nov_3() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_persists_session() {
        let fx = Fixture::new().await;
        let session = fx.login("gv01", "secret").await;
        assert_eq!(session.class_name, "10A1");
        assert_eq!(fx.ctx.session().unwrap(), session);
    }

    #[tokio::test]
    async fn test_login_failures_leave_no_session() {
        let fx = Fixture::new().await;
        assert!(matches!(
            auth::login(&fx.ctx, "gv01", "nope").await,
            Err(ScoreError::WrongPassword)
        ));
        assert!(matches!(
            auth::login(&fx.ctx, "ghost", "secret").await,
            Err(ScoreError::AccountNotFound { .. })
        ));
        assert!(matches!(fx.ctx.session(), Err(ScoreError::NotLoggedIn)));
    }

    #[test]
    fn test_read_password_takes_first_line() {
        let input = std::io::Cursor::new("s3cret pw\r\nignored\n");
        assert_eq!(auth::read_password(input).unwrap(), "s3cret pw");
        let empty = std::io::Cursor::new("");
        assert_eq!(auth::read_password(empty).unwrap(), "");
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let fx = Fixture::new().await;
        fx.login("gv01", "secret").await;
        auth::handle_logout(fx.dir.path()).unwrap();
        assert!(matches!(fx.ctx.session(), Err(ScoreError::NotLoggedIn)));
    }
}

mod submit_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_then_resubmit() {
        let fx = Fixture::new().await;
        let session = fx.login("gv01", "secret").await;
        let params = scores::SubmitParams {
            counts: counts(&["late_arrival=2", "grade_10=1"]),
            class: None,
            date: nov_3(),
        };

        let first = scores::submit(&fx.ctx, &session, &params, "2025-11-03 08:00:00")
            .await
            .unwrap();
        assert_eq!(first.week, Week(9));
        assert_eq!(first.outcome, ReconcileOutcome::Inserted { row: 0, total: 1 });

        let params = scores::SubmitParams {
            counts: counts(&["grade_10=3"]),
            ..params
        };
        let second = scores::submit(&fx.ctx, &session, &params, "2025-11-04 09:00:00")
            .await
            .unwrap();
        assert_eq!(second.outcome, ReconcileOutcome::Updated { row: 0, total: 15 });

        let sheet = fx.ctx.load_scores().await.unwrap();
        let rows = sheet.score_rows(&fx.ctx.rubric);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_counts["late_arrival"], 0);
        assert_eq!(rows[0].submitted_by, "gv01");
        assert_eq!(rows[0].timestamp, "2025-11-04 09:00:00");
    }

    #[tokio::test]
    async fn test_user_cannot_submit_other_class() {
        let fx = Fixture::new().await;
        let session = fx.login("gv01", "secret").await;
        let params = scores::SubmitParams {
            counts: counts(&["late_arrival=1"]),
            class: Some("10A2".to_string()),
            date: nov_3(),
        };
        assert!(matches!(
            scores::submit(&fx.ctx, &session, &params, "t").await,
            Err(ScoreError::PermissionDenied { .. })
        ));
    }

    #[tokio::test]
    async fn test_admin_needs_explicit_class() {
        let fx = Fixture::new().await;
        let admin = fx.login("admin", "root").await;
        let mut params = scores::SubmitParams {
            counts: Vec::new(),
            class: None,
            date: nov_3(),
        };
        assert!(matches!(
            scores::submit(&fx.ctx, &admin, &params, "t").await,
            Err(ScoreError::MissingClass)
        ));

        params.class = Some("10A2".to_string());
        let report = scores::submit(&fx.ctx, &admin, &params, "t").await.unwrap();
        assert_eq!(report.outcome.total(), 0);
    }

    #[tokio::test]
    async fn test_unknown_key_and_malformed_count() {
        let fx = Fixture::new().await;
        let rubric = &fx.ctx.rubric;
        assert!(matches!(
            scores::build_counts(rubric, &counts(&["dancing=1"])),
            Err(ScoreError::UnknownRubricItem { .. })
        ));

        let parsed = scores::build_counts(rubric, &counts(&["late_arrival=abc", "profanity=-2"]))
            .unwrap();
        assert_eq!(parsed["late_arrival"], 0);
        assert_eq!(parsed["profanity"], 0);
    }

    #[tokio::test]
    async fn test_submit_on_uninitialized_sheet() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_lookup(Some(BackendKind::Sqlite), |_| None).unwrap();
        let ctx = CommandContext::new(
            config,
            SqliteStore::new_in_memory().unwrap(),
            dir.path().to_path_buf(),
        );
        let session = Session {
            username: "gv01".to_string(),
            role: crate::Role::User,
            class_name: "10A1".to_string(),
            display_name: String::new(),
        };
        let params = scores::SubmitParams {
            counts: Vec::new(),
            class: None,
            date: nov_3(),
        };
        assert!(matches!(
            scores::submit(&ctx, &session, &params, "t").await,
            Err(ScoreError::EmptyTable { .. })
        ));
    }
}

mod view_tests {
    use super::*;

    async fn seeded() -> Fixture {
        let fx = Fixture::new().await;
        let admin = fx.login("admin", "root").await;
        for (class, date) in [
            ("10A1", nov_3()),
            ("10A2", nov_3()),
            ("10A1", NaiveDate::from_ymd_opt(2025, 11, 10).unwrap()),
        ] {
            let params = scores::SubmitParams {
                counts: counts(&["grade_10=1"]),
                class: Some(class.to_string()),
                date,
            };
            scores::submit(&fx.ctx, &admin, &params, "t").await.unwrap();
        }
        fx
    }

    #[tokio::test]
    async fn test_visible_rows_by_role() {
        let fx = seeded().await;
        let sheet = fx.ctx.load_scores().await.unwrap();
        let admin = fx.login("admin", "root").await;
        let user = fx.login("gv01", "secret").await;

        assert_eq!(scores::visible_rows(&sheet, &admin, None, None).unwrap().len(), 3);
        assert_eq!(
            scores::visible_rows(&sheet, &admin, None, Some(Week(9)))
                .unwrap()
                .len(),
            2
        );
        assert_eq!(scores::visible_rows(&sheet, &user, None, None).unwrap(), vec![0, 2]);
        assert!(matches!(
            scores::visible_rows(&sheet, &user, Some("10A2"), None),
            Err(ScoreError::PermissionDenied { .. })
        ));
    }

    #[tokio::test]
    async fn test_row_records_have_numeric_totals() {
        let fx = seeded().await;
        let sheet = fx.ctx.load_scores().await.unwrap();
        let records = scores::row_records(&sheet, &fx.ctx.rubric, &[1]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Lớp"], serde_json::json!("10A2"));
        assert_eq!(records[0]["Tổng điểm"], serde_json::json!(5));
    }

    #[tokio::test]
    async fn test_edit_requires_admin_and_merges() {
        let fx = seeded().await;
        let file = fx.write_file(
            "edited.json",
            r#"[
                {"Lớp": "10A2", "Tuần": "9", "Điểm 10": "4", "Tổng điểm": "999"},
                {"Lớp": "11B1", "Tuần": "9", "Đi trễ": 1},
                {"Lớp": "", "Tuần": ""}
            ]"#,
        );

        let user = fx.login("gv01", "secret").await;
        assert!(matches!(
            scores::edit(&fx.ctx, &user, &file, MergeMode::Merge).await,
            Err(ScoreError::PermissionDenied { .. })
        ));

        let admin = fx.login("admin", "root").await;
        let summary = scores::edit(&fx.ctx, &admin, &file, MergeMode::Merge)
            .await
            .unwrap();
        assert_eq!((summary.updated, summary.appended, summary.skipped), (1, 1, 1));

        let sheet = fx.ctx.load_scores().await.unwrap();
        let rows = sheet.score_rows(&fx.ctx.rubric);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].total, 20);
        assert_eq!(sheet.stored_total(1), 20);
        assert_eq!(rows[3].class_name, "11B1");
        assert_eq!(rows[3].total, -2);
    }

    #[tokio::test]
    async fn test_edit_replace_mode() {
        let fx = seeded().await;
        let admin = fx.login("admin", "root").await;
        let file = fx.write_file("replace.json", r#"[{"Lớp": "12C1", "Tuần": "10"}]"#);

        scores::edit(&fx.ctx, &admin, &file, MergeMode::Replace)
            .await
            .unwrap();
        let sheet = fx.ctx.load_scores().await.unwrap();
        assert_eq!(sheet.table.len(), 1);
        assert_eq!(sheet.score_rows(&fx.ctx.rubric)[0].class_name, "12C1");
    }
}

mod sheet_tests {
    use super::*;

    #[tokio::test]
    async fn test_init_sheet_is_idempotent() {
        let fx = Fixture::new().await;
        assert!(!scores::init_sheet(&fx.ctx).await.unwrap());
        let sheet = fx.ctx.load_scores().await.unwrap();
        assert!(sheet.is_loaded());
        assert!(sheet.table.is_empty());
    }

    #[tokio::test]
    async fn test_import_accounts_raw() {
        let fx = Fixture::new().await;
        let file = fx.write_file(
            "accounts.json",
            r#"[["Username", "Password", "Quyen"], ["gv05", "pw", "user"]]"#,
        );
        let rows = scores::import(&fx.ctx, ACCOUNTS_SHEET, &file).await.unwrap();
        assert_eq!(rows, 1);

        let session = fx.login("gv05", "pw").await;
        assert_eq!(session.username, "gv05");
        assert!(matches!(
            auth::login(&fx.ctx, "gv01", "secret").await,
            Err(ScoreError::AccountNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_import_scores_normalizes() {
        let fx = Fixture::new().await;
        let file = fx.write_file(
            "scores.json",
            r#"[["Tuần", "Lớp", "di tre", "Tổng điểm"], ["9", "10A1", "x", "7"], ["9", "10A2", 2, ""]]"#,
        );
        let rows = scores::import(&fx.ctx, SCORE_SHEET, &file).await.unwrap();
        assert_eq!(rows, 2);

        let raw = fx.ctx.store.read_all(SCORE_SHEET).await.unwrap();
        assert_eq!(raw[0][0], "Ngày nhập");
        assert_eq!(raw[0][2], "Tuần");
        assert_eq!(raw[0][3], "Lớp");

        let sheet = ScoreSheet::from_values(SCORE_SHEET, raw, &fx.ctx.rubric);
        assert_eq!(sheet.stored_total(0), 0);
        assert_eq!(sheet.stored_total(1), -4);
    }

    #[test]
    fn test_parse_import_shapes() {
        let rows = scores::parse_import(r#"[{"Lớp": "10A1", "Tuần": 9}]"#).unwrap();
        assert_eq!(rows[0], vec!["Lớp", "Tuần"]);
        assert_eq!(rows[1], vec!["10A1", "9"]);

        assert!(scores::parse_import("[]").unwrap().is_empty());
        assert!(matches!(
            scores::parse_import(r#"{"a": 1}"#),
            Err(ScoreError::InvalidConfig { .. })
        ));
        assert!(matches!(
            scores::parse_import(r#"[["a"], 5]"#),
            Err(ScoreError::InvalidConfig { .. })
        ));
    }
}

mod assistant_tests {
    use super::*;

    #[tokio::test]
    async fn test_summary_is_admin_only() {
        let fx = Fixture::new().await;
        let generator = FakeGenerator::replying("Tuần tốt.");

        let user = fx.login("gv01", "secret").await;
        assert!(matches!(
            assistant::summary(&fx.ctx, &user, &generator).await,
            Err(ScoreError::PermissionDenied { .. })
        ));

        let admin = fx.login("admin", "root").await;
        let text = assistant::summary(&fx.ctx, &admin, &generator).await.unwrap();
        assert_eq!(text, crate::assistant::NO_DATA_MESSAGE);
    }

    #[tokio::test]
    async fn test_chat_scopes_data_and_persists() {
        let fx = Fixture::new().await;
        let admin = fx.login("admin", "root").await;
        for class in ["10A1", "10A2"] {
            let params = scores::SubmitParams {
                counts: Vec::new(),
                class: Some(class.to_string()),
                date: nov_3(),
            };
            scores::submit(&fx.ctx, &admin, &params, "t").await.unwrap();
        }

        let user = fx.login("gv01", "secret").await;
        let generator = FakeGenerator::replying("Lớp 10A1 ổn.");
        let reply = assistant::chat(&fx.ctx, &user, &generator, "Lớp tôi thế nào?")
            .await
            .unwrap();
        assert_eq!(reply, "Lớp 10A1 ổn.");

        {
            let calls = generator.calls.borrow();
            let data = &calls[0][1].text;
            assert!(data.contains("10A1"));
            assert!(!data.contains("10A2"));
        }

        assistant::chat(&fx.ctx, &user, &generator, "Còn gì nữa?")
            .await
            .unwrap();
        assert_eq!(generator.calls.borrow()[1].len(), 5);
    }

    async fn submit_both_classes(fx: &Fixture) {
        let admin = fx.login("admin", "root").await;
        for class in ["10A1", "10A2"] {
            let params = scores::SubmitParams {
                counts: Vec::new(),
                class: Some(class.to_string()),
                date: nov_3(),
            };
            scores::submit(&fx.ctx, &admin, &params, "t").await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_similar_usernames_keep_separate_histories() {
        let fx = Fixture::new().await;
        let extra: Vec<Vec<CellValue>> = [
            ["gv.10a1", "a", "User", "10A1", ""],
            ["gv_10a1", "b", "User", "10A2", ""],
        ]
            .iter()
            .map(|row| row.iter().map(|c| CellValue::from(*c)).collect())
            .collect();
        fx.ctx
            .store
            .write_rows(ACCOUNTS_SHEET, 4, &extra)
            .await
            .unwrap();
        submit_both_classes(&fx).await;

        let first = fx.login("gv.10a1", "a").await;
        let generator = FakeGenerator::replying("ok");
        assistant::chat(&fx.ctx, &first, &generator, "Lớp tôi?")
            .await
            .unwrap();

        let second = fx.login("gv_10a1", "b").await;
        let other = FakeGenerator::replying("ok");
        assistant::chat(&fx.ctx, &second, &other, "Lớp tôi?")
            .await
            .unwrap();

        let calls = other.calls.borrow();
        assert_eq!(calls[0].len(), 3);
        assert!(calls[0][1].text.contains("10A2"));
        assert!(!calls[0][1].text.contains("10A1"));
    }

    #[tokio::test]
    async fn test_logout_and_login_discard_history() {
        let fx = Fixture::new().await;
        submit_both_classes(&fx).await;
        let history = crate::core::chat_history_path(fx.dir.path(), "gv01");

        let user = fx.login("gv01", "secret").await;
        let generator = FakeGenerator::replying("ok");
        assistant::chat(&fx.ctx, &user, &generator, "?").await.unwrap();
        assert!(history.exists());

        assert!(auth::logout(fx.dir.path()).unwrap());
        assert!(!history.exists());

        assistant::chat(&fx.ctx, &user, &generator, "?").await.unwrap();
        assert!(history.exists());
        fx.login("gv01", "secret").await;
        assert!(!history.exists());
    }
}
