use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CreateEntryCmd, DateRange, Engine, EngineError, EntryKind, ModeCatalog, Money, RegisterUserCmd,
    ReportFormat, Role, Scope, UpdateEntryCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    engine
        .register_user(RegisterUserCmd::new("olivia", "password", Role::Owner).name("Olivia"))
        .await
        .unwrap();
    engine
        .register_user(RegisterUserCmd::new("sam", "password", Role::Staff))
        .await
        .unwrap();
    engine
        .register_user(RegisterUserCmd::new("tess", "password", Role::Staff))
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn add(
    engine: &Engine,
    kind: EntryKind,
    user: &str,
    on: &str,
    description: &str,
    mode: &str,
    amount: &str,
) -> Uuid {
    engine
        .create_entry(CreateEntryCmd::new(kind, user, on, description, mode, amount))
        .await
        .unwrap()
}

#[tokio::test]
async fn create_then_fetch_round_trips_fields() {
    let (engine, _db) = engine_with_db().await;

    let id = add(
        &engine,
        EntryKind::Expense,
        "sam",
        "2025-01-05",
        "  Office rent ",
        "sbi",
        "1250.5",
    )
    .await;

    let entry = engine
        .entry(EntryKind::Expense, id, &Scope::OwnedBy("sam".to_string()))
        .await
        .unwrap();
    assert_eq!(entry.id, id);
    assert_eq!(entry.owner, "sam");
    assert_eq!(entry.date, date(2025, 1, 5));
    assert_eq!(entry.description, "Office rent");
    assert_eq!(entry.mode, "sbi");
    assert_eq!(entry.amount, Money::new(125_050));
    assert_eq!(entry.created_at, entry.updated_at);

    // The same id is not an income.
    assert_eq!(
        engine
            .entry(EntryKind::Income, id, &Scope::All)
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("entry not exists".to_string())
    );
}

#[tokio::test]
async fn create_rejects_invalid_fields() {
    let (engine, _db) = engine_with_db().await;
    let cmd = |date: &str, description: &str, mode: &str, amount: &str| {
        CreateEntryCmd::new(EntryKind::Income, "sam", date, description, mode, amount)
    };

    let err = engine
        .create_entry(cmd("05/01/2025", "Salary", "cash", "10"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_entry(cmd("2025-01-05", "Salary", "cash", "12.345"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_entry(cmd("2025-01-05", "Salary", "cash", "12345678901"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_entry(cmd("2025-01-05", "Salary", "paypal", "10"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_entry(cmd("2025-01-05", &"x".repeat(256), "cash", "10"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let all = engine
        .entries(EntryKind::Income, &Scope::All, None)
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn custom_modes_replace_the_defaults() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .modes(ModeCatalog::new(["upi"], ["cash", "card"]).unwrap())
        .build()
        .await
        .unwrap();
    engine
        .register_user(RegisterUserCmd::new("sam", "password", Role::Staff))
        .await
        .unwrap();

    assert_eq!(engine.allowed_modes(EntryKind::Income), ["upi"]);
    add(&engine, EntryKind::Income, "sam", "2025-01-01", "Sale", "upi", "5").await;
    let err = engine
        .create_entry(CreateEntryCmd::new(
            EntryKind::Income,
            "sam",
            "2025-01-01",
            "Sale",
            "cash",
            "5",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn blank_description_is_stored_empty() {
    let (engine, _db) = engine_with_db().await;
    let scope = Scope::OwnedBy("sam".to_string());

    let id = add(&engine, EntryKind::Expense, "sam", "2025-01-05", "   ", "cash", "1.00").await;
    let entry = engine.entry(EntryKind::Expense, id, &scope).await.unwrap();
    assert_eq!(entry.description, "");

    let id = add(&engine, EntryKind::Income, "sam", "2025-01-06", "Invoice", "cash", "5").await;
    let updated = engine
        .update_entry(UpdateEntryCmd::new(EntryKind::Income, id, "sam").description(""))
        .await
        .unwrap();
    assert_eq!(updated.description, "");
    assert_eq!(
        engine.entry(EntryKind::Income, id, &scope).await.unwrap().description,
        ""
    );
}

#[tokio::test]
async fn update_applies_only_present_fields() {
    let (engine, _db) = engine_with_db().await;
    let id = add(&engine, EntryKind::Income, "sam", "2025-02-01", "Invoice", "cash", "100").await;

    let updated = engine
        .update_entry(
            UpdateEntryCmd::new(EntryKind::Income, id, "sam")
                .amount("150.25")
                .mode("hdfc"),
        )
        .await
        .unwrap();

    assert_eq!(updated.amount, Money::new(15_025));
    assert_eq!(updated.mode, "hdfc");
    assert_eq!(updated.description, "Invoice");
    assert_eq!(updated.date, date(2025, 2, 1));
    assert!(updated.updated_at >= updated.created_at);

    let err = engine
        .update_entry(
            UpdateEntryCmd::new(EntryKind::Income, id, "sam").description("x".repeat(256)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let unchanged = engine
        .update_entry(UpdateEntryCmd::new(EntryKind::Income, id, "sam"))
        .await
        .unwrap();
    assert_eq!(unchanged, updated);
}

#[tokio::test]
async fn writes_on_foreign_entries_are_not_found_even_for_owner() {
    let (engine, _db) = engine_with_db().await;
    let id = add(&engine, EntryKind::Expense, "sam", "2025-02-01", "Fuel", "cash", "40").await;
    let not_found = EngineError::KeyNotFound("entry not exists".to_string());

    let err = engine
        .update_entry(UpdateEntryCmd::new(EntryKind::Expense, id, "olivia").amount("1"))
        .await
        .unwrap_err();
    assert_eq!(err, not_found);

    let err = engine
        .delete_entry(EntryKind::Expense, id, "olivia")
        .await
        .unwrap_err();
    assert_eq!(err, not_found);

    let err = engine
        .delete_entry(EntryKind::Expense, id, "tess")
        .await
        .unwrap_err();
    assert_eq!(err, not_found);

    // Still there, untouched.
    let entry = engine.entry(EntryKind::Expense, id, &Scope::All).await.unwrap();
    assert_eq!(entry.amount, Money::new(4_000));

    engine
        .delete_entry(EntryKind::Expense, id, "sam")
        .await
        .unwrap();
    assert_eq!(
        engine
            .entry(EntryKind::Expense, id, &Scope::All)
            .await
            .unwrap_err(),
        not_found
    );
}

#[tokio::test]
async fn owner_reads_everything_and_staff_reads_own() {
    let (engine, db) = engine_with_db().await;
    add(&engine, EntryKind::Income, "sam", "2025-01-01", "A", "cash", "10").await;
    add(&engine, EntryKind::Income, "tess", "2025-01-02", "B", "cash", "20").await;
    add(&engine, EntryKind::Income, "olivia", "2025-01-03", "C", "cash", "30").await;

    assert_eq!(engine.scope_for("olivia").await.unwrap(), Scope::All);
    let sam_scope = engine.scope_for("sam").await.unwrap();
    assert_eq!(sam_scope, Scope::OwnedBy("sam".to_string()));

    let all = engine
        .entries(EntryKind::Income, &Scope::All, None)
        .await
        .unwrap();
    let descriptions: Vec<&str> = all.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descriptions, ["C", "B", "A"]);

    let own = engine
        .entries(EntryKind::Income, &sam_scope, None)
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].owner, "sam");

    // A login without a profile row only sees its own entries.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["legacy".into(), "password".into()],
    ))
    .await
    .unwrap();
    assert_eq!(
        engine.scope_for("legacy").await.unwrap(),
        Scope::OwnedBy("legacy".to_string())
    );
}

#[tokio::test]
async fn listing_honors_date_range() {
    let (engine, _db) = engine_with_db().await;
    for day in ["2025-01-01", "2025-01-15", "2025-02-01"] {
        add(&engine, EntryKind::Expense, "sam", day, "Lunch", "cash", "5").await;
    }

    let range = DateRange::parse(Some("2025-01-10"), Some("2025-02-01")).unwrap();
    let entries = engine
        .entries(EntryKind::Expense, &Scope::All, Some(range))
        .await
        .unwrap();
    let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
    assert_eq!(dates, [date(2025, 2, 1), date(2025, 1, 15)]);
}

#[tokio::test]
async fn dashboard_is_scoped_by_role() {
    let (engine, _db) = engine_with_db().await;
    add(&engine, EntryKind::Income, "sam", "2025-03-01", "Sale", "cash", "100.10").await;
    add(&engine, EntryKind::Expense, "sam", "2025-03-02", "Stock", "sbi", "33.33").await;
    add(&engine, EntryKind::Income, "tess", "2025-02-10", "Sale", "hdfc", "50").await;

    let (scope, summary) = engine.dashboard("sam", date(2025, 3, 31)).await.unwrap();
    assert_eq!(scope, Scope::OwnedBy("sam".to_string()));
    assert_eq!(summary.balance.to_string(), "66.77");
    assert_eq!(summary.transaction_count, 2);
    assert_eq!(summary.recent.len(), 2);
    assert_eq!(summary.recent[0].kind, EntryKind::Expense);

    let (scope, summary) = engine.dashboard("olivia", date(2025, 3, 31)).await.unwrap();
    assert_eq!(scope, Scope::All);
    assert_eq!(summary.total_income, Money::new(15_010));
    assert_eq!(summary.transaction_count, 3);
    assert_eq!(summary.months.len(), 6);
    assert_eq!(summary.months[4].label, "Feb 2025");
    assert_eq!(summary.months[4].income, Money::new(5_000));
    assert_eq!(summary.income_modes[0].label, "cash");
}

#[tokio::test]
async fn export_contains_scoped_rows_and_total() {
    let (engine, _db) = engine_with_db().await;
    add(&engine, EntryKind::Expense, "sam", "2025-01-02", "Rent", "sbi", "500").await;
    add(&engine, EntryKind::Expense, "sam", "2025-01-01", "Power", "cash", "200").await;
    add(&engine, EntryKind::Expense, "tess", "2025-01-03", "Water", "cash", "75").await;

    let report = engine
        .report("sam", EntryKind::Expense, date(2025, 1, 31))
        .await
        .unwrap();
    let rows = report.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "01-Jan-2025");
    assert_eq!(rows[1][1], "Rent");
    assert_eq!(rows[2][2], "Total");
    assert_eq!(rows[2][3], "700.00");
    assert_eq!(report.headers()[3], "Amount (INR)");

    let export = engine
        .export("sam", EntryKind::Expense, ReportFormat::Spreadsheet, date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(export.file_name, "expenses_2025-01-31.xlsx");
    assert!(export.bytes.starts_with(b"PK"));

    let first = engine
        .export("olivia", EntryKind::Expense, ReportFormat::Paginated, date(2025, 1, 31))
        .await
        .unwrap();
    let second = engine
        .export("olivia", EntryKind::Expense, ReportFormat::Paginated, date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(first.file_name, "expenses_2025-01-31.pdf");
    assert_eq!(first.content_type, "application/pdf");
    assert!(first.bytes.starts_with(b"%PDF-"));
    assert_eq!(first.bytes, second.bytes);
}

#[tokio::test]
async fn registration_is_atomic_and_unique() {
    let (engine, db) = engine_with_db().await;

    let err = engine
        .register_user(RegisterUserCmd::new("sam", "other", Role::Owner))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("sam".to_string()));
    assert_eq!(
        engine.scope_for("sam").await.unwrap(),
        Scope::OwnedBy("sam".to_string())
    );

    let err = engine
        .register_user(RegisterUserCmd::new(" ", "password", Role::Staff))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let profile = engine
        .register_user(
            RegisterUserCmd::new("nina", "secret", Role::Owner)
                .name(" Nina ")
                .email(""),
        )
        .await
        .unwrap();
    assert_eq!(profile.name.as_deref(), Some("Nina"));
    assert_eq!(profile.email, None);
    assert_eq!(engine.profile_of("nina").await.unwrap(), Some(profile));

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS n FROM profiles",
        ))
        .await
        .unwrap()
        .unwrap();
    let profiles: i64 = row.try_get("", "n").unwrap();
    assert_eq!(profiles, 4);
}

#[tokio::test]
async fn authentication_checks_exact_credentials() {
    let (engine, _db) = engine_with_db().await;

    let user = engine.authenticate("sam", "password").await.unwrap();
    assert_eq!(user.username, "sam");

    for (username, password) in [("sam", "pass"), ("sa", "password"), ("", ""), ("ghost", "x")] {
        assert!(matches!(
            engine.authenticate(username, password).await,
            Err(EngineError::Unauthorized(_))
        ));
    }
}

#[tokio::test]
async fn greeting_is_reported_once_per_session() {
    let (engine, _db) = engine_with_db().await;

    let session = engine.open_session("sam").await.unwrap();
    assert!(!session.greeting_shown);
    assert!(engine.take_greeting(session.id, "sam").await.unwrap());
    assert!(!engine.take_greeting(session.id, "sam").await.unwrap());

    // Another user cannot touch it.
    assert!(matches!(
        engine.take_greeting(session.id, "tess").await,
        Err(EngineError::KeyNotFound(_))
    ));

    let next = engine.open_session("sam").await.unwrap();
    assert!(engine.take_greeting(next.id, "sam").await.unwrap());

    engine.close_session(session.id, "sam").await.unwrap();
    assert!(matches!(
        engine.take_greeting(session.id, "sam").await,
        Err(EngineError::KeyNotFound(_))
    ));
}
