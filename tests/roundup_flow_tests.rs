use roundup_embed::{
    EmbedCache, EmbedOutcome, Platform, PlatformFilter, RoundupConfig, RoundupService,
    RoundupSession,
};
use std::time::Duration;

#[test]
fn test_analyze_then_filter_session() {
    let service = RoundupService::new();
    let links = service.analyze(
        "Facebook Aviso\nhttps://www.facebook.com/share/p/abc/\n\nX Aviso\nhttps://x.com/alguien/status/99",
    );
    assert_eq!(links.len(), 2);

    let mut session = RoundupSession::new();
    session.set_links(links);

    assert_eq!(session.visible().len(), 2);

    session.set_filter(PlatformFilter::Only(Platform::Twitter));
    let visible = session.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].url, "https://x.com/alguien/status/99");

    session.clear();
    assert!(session.visible().is_empty());
}

#[tokio::test]
async fn test_embed_degrades_to_card_for_non_post_urls() {
    // Facebook host but not an embeddable post shape: the strategy rejects
    // it before any network traffic, so this stays hermetic.
    let service = RoundupService::new_with_config(
        RoundupConfig::new(10).with_embed_deadline(Duration::from_secs(2)),
    );

    let links = service.analyze("Facebook Página\nhttps://www.facebook.com/alguna.pagina");
    assert_eq!(links.len(), 1);

    match service.embed(&links[0]).await {
        EmbedOutcome::Fallback { card } => {
            assert_eq!(card.platform, Platform::Facebook);
            assert_eq!(card.title, "Página");
            assert_eq!(card.url, "https://www.facebook.com/alguna.pagina");
        }
        EmbedOutcome::Rendered { .. } => panic!("non-post URL must degrade to a card"),
    }
}

#[tokio::test]
async fn test_cached_widget_short_circuits_the_load() {
    let cache = EmbedCache::new(10);
    let service = RoundupService::new_with_config(
        RoundupConfig::new(10)
            .with_embed_deadline(Duration::from_secs(2))
            .with_cache(cache.clone()),
    );

    // A real post URL that would normally require a network probe; the
    // pre-seeded entry must be returned before any request is attempted.
    let links = service.analyze("Facebook Aviso\nhttps://www.facebook.com/share/p/14JZkDVzxbL/");
    assert_eq!(links.len(), 1);

    cache
        .set(
            links[0].url.clone(),
            EmbedOutcome::Rendered {
                html: "<iframe>seeded</iframe>".into(),
            },
        )
        .await;

    match service.embed(&links[0]).await {
        EmbedOutcome::Rendered { html } => assert_eq!(html, "<iframe>seeded</iframe>"),
        EmbedOutcome::Fallback { .. } => panic!("cache hit must short-circuit the load"),
    }
}

#[tokio::test]
async fn test_fallback_outcomes_are_not_cached() {
    let cache = EmbedCache::new(10);
    let service = RoundupService::new_with_config(
        RoundupConfig::new(10)
            .with_embed_deadline(Duration::from_secs(2))
            .with_cache(cache.clone()),
    );

    let links = service.analyze("Facebook Página\nhttps://www.facebook.com/alguna.pagina");
    assert_eq!(links.len(), 1);

    match service.embed(&links[0]).await {
        EmbedOutcome::Fallback { .. } => {}
        EmbedOutcome::Rendered { .. } => panic!("non-post URL must degrade to a card"),
    }

    // The failed load stays retryable: nothing was stored for the URL.
    assert!(cache.get(&links[0].url).await.is_none());
}

#[tokio::test]
async fn test_embed_all_returns_one_outcome_per_record_in_order() {
    let service = RoundupService::new_with_config(
        RoundupConfig::new(10).with_embed_deadline(Duration::from_secs(2)),
    );

    // Both are rejected by their post patterns before any request is made.
    let links = service.analyze(
        "Facebook Uno\nhttps://www.facebook.com/pagina.uno\n\nFacebook Dos\nhttps://www.facebook.com/pagina.dos",
    );
    assert_eq!(links.len(), 2);

    let outcomes = service.embed_all(&links).await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].0, links[0].id);
    assert_eq!(outcomes[1].0, links[1].id);
    for (_, outcome) in outcomes {
        assert!(matches!(outcome, EmbedOutcome::Fallback { .. }));
    }
}
