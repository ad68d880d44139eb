use vitrine::KabumClient;

#[tokio::test]
#[ignore] // Requires a Chromium installation and network access
async fn kabum_live_smoke() {
    let client = KabumClient::default();
    let items = client
        .search("controle ps5", 5, 1)
        .await
        .expect("browser launches");

    assert!(items.len() <= 5);
    for item in &items {
        assert!(item.url.starts_with("https://www.kabum.com.br/"));
        assert!(!item.title.is_empty());
        assert_eq!(item.source, "kabum");
    }
}
