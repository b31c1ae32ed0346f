use super::*;
use url::Url;

fn entry(name: &str, role: &str, region: &str, order: i64, featured: bool) -> TechnologistEntry {
    TechnologistEntry {
        name: name.to_string(),
        role: role.to_string(),
        region: region.to_string(),
        location: format!("{name}ville"),
        link: Url::parse(&format!("https://example.com/{}", name.to_lowercase())).expect("link"),
        order,
        featured,
    }
}

fn submission() -> JoinSubmission {
    JoinSubmission {
        name: "Kai Kahale".to_string(),
        location: "Honolulu, HI".to_string(),
        website: "https://kai.dev".to_string(),
        focuses: vec!["Engineering".to_string(), "Design".to_string()],
        focus_suggested: None,
        title: Some("Staff Engineer".to_string()),
        years_experience: "5 – 9 years".to_string(),
    }
}

#[tokio::test]
async fn members_roundtrip_preserves_fields_and_insertion_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .insert_member(&entry("Kai", "Engineer", "Oahu", 2, true))
        .await
        .expect("insert");
    storage
        .insert_member(&entry("Leilani", "Designer", "Maui", 1, false))
        .await
        .expect("insert");

    let members = storage.list_members().await.expect("list");
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].name, "Kai");
    assert_eq!(members[0].link, "https://example.com/kai");
    assert_eq!(members[0].sort_order, 2);
    assert!(members[0].featured);
    assert_eq!(members[1].name, "Leilani");
    assert!(!members[1].featured);
}

#[tokio::test]
async fn count_members_tracks_inserts() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.count_members().await.expect("count"), 0);
    storage
        .insert_member(&entry("Kai", "Engineer", "Oahu", 1, false))
        .await
        .expect("insert");
    assert_eq!(storage.count_members().await.expect("count"), 1);
}

#[tokio::test]
async fn submissions_roundtrip_including_optional_fields() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let with_optionals = submission();
    let without_optionals = JoinSubmission {
        focus_suggested: Some("Bioinformatics".to_string()),
        title: None,
        ..submission()
    };

    let first = storage
        .insert_join_submission(&with_optionals)
        .await
        .expect("insert");
    let second = storage
        .insert_join_submission(&without_optionals)
        .await
        .expect("insert");
    assert!(second > first);

    let stored = storage.list_join_submissions().await.expect("list");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].focuses, vec!["Engineering", "Design"]);
    assert_eq!(stored[0].title.as_deref(), Some("Staff Engineer"));
    assert_eq!(stored[0].focus_suggested, None);
    assert_eq!(stored[1].focus_suggested.as_deref(), Some("Bioinformatics"));
    assert_eq!(stored[1].title, None);
}

#[tokio::test]
async fn draft_store_upserts_and_removes_fields() {
    let drafts = DraftStore::new("sqlite::memory:").await.expect("db");
    assert_eq!(drafts.get_item("jf_name").await.expect("get"), None);

    drafts.set_item("jf_name", "Kai").await.expect("set");
    drafts.set_item("jf_name", "Kai Kahale").await.expect("set");
    assert_eq!(
        drafts.get_item("jf_name").await.expect("get").as_deref(),
        Some("Kai Kahale")
    );

    drafts.remove_item("jf_name").await.expect("remove");
    assert_eq!(drafts.get_item("jf_name").await.expect("get"), None);
    // Removing an absent field stays quiet.
    drafts.remove_item("jf_name").await.expect("remove");
}

#[tokio::test]
async fn health_check_pings_the_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("healthy");
}
