//! Route table, hash resolution and context navigation.

use app::{AppContext, BootConfig, Route, RouteError, Router};

#[test]
fn default_table_starts_at_home() {
    let router = Router::default();
    assert_eq!(router.current(), Route::new("home", "/"));
    assert_eq!(
        router
            .routes()
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>(),
        vec!["home", "about"]
    );
}

#[test]
fn hash_fragments_resolve() {
    let router = Router::default();
    assert_eq!(router.resolve("#/about").unwrap().name, "about");
    assert_eq!(router.resolve("#").unwrap().name, "home");
    assert_eq!(router.resolve("/about/").unwrap().name, "about");
}

#[test]
fn unknown_path_keeps_current_route() {
    let router = Router::default();
    router.navigate("#/about").unwrap();
    assert_eq!(
        router.navigate("#/missing"),
        Err(RouteError::NotFound("/missing".into()))
    );
    assert_eq!(router.current().name, "about");
}

#[test]
fn invalid_tables_are_rejected() {
    assert!(matches!(Router::new(Vec::new()), Err(RouteError::Empty)));
    assert_eq!(
        Router::new(vec![Route::new("a", "/x"), Route::new("b", "x/")]).err(),
        Some(RouteError::Duplicate("/x".into()))
    );
}

#[test]
fn hrefs_and_lookup_by_name() {
    let router = Router::default();
    let about = router.by_name("about").unwrap();
    assert_eq!(about.href(), "#/about");
    assert_eq!(router.by_name("settings"), None);
}

#[test]
fn context_navigation_updates_store() {
    let ctx = AppContext::new(BootConfig::default(), Router::default());
    assert_eq!(ctx.store.snapshot().route, "/");

    ctx.navigate("#/about").unwrap();
    assert_eq!(ctx.store.snapshot().route, "/about");
    assert!(ctx.navigate("/nope").is_err());
    assert_eq!(ctx.store.snapshot().route, "/about");
}
