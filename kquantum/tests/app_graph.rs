use kquantum::{
    App, AppConfig, Application, Error,
    di::{Dc, error::Error as DiError},
    remote::{ApiClient, TokenManager},
    scopes::{ACTIVITY, FRAGMENT, SERVICE, VIEW_MODEL, VIEW_WITH_FRAGMENT},
    services::{AuthService, QuantumBridgeService},
    viewmodels::{HomeViewModel, ProfileViewModel},
};
use std::{
    io::Write,
    sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}},
};

fn start() -> Application {
    Application::start(AppConfig::default()).unwrap()
}

#[test]
fn it_validates_the_application_graph() {
    let app = App::new(AppConfig::default());

    let manifest = app.manifest();

    assert_eq!(manifest.scopes.len(), 7);
    assert!(manifest.validate().is_ok());
    assert!(app.start().is_ok());
}

#[test]
fn it_shares_singletons_between_view_model_scopes() {
    let app = start();
    let retained = app.activity_retained().unwrap();

    let first = retained.enter(VIEW_MODEL).unwrap();
    let second = retained.enter(VIEW_MODEL).unwrap();

    let a = first.resolve::<HomeViewModel>().unwrap();
    let b = second.resolve::<HomeViewModel>().unwrap();
    let again = first.resolve::<HomeViewModel>().unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &again));
    assert!(Dc::ptr_eq(&a.auth, &b.auth));
    assert!(Arc::ptr_eq(&a.auth.clone().into_inner(), &app.resolve::<AuthService>().unwrap()));
}

#[test]
fn it_constructs_the_api_client_once() {
    let app = start();
    let retained = app.activity_retained().unwrap();
    let screen = retained.enter(VIEW_MODEL).unwrap();

    let profile = screen.resolve::<ProfileViewModel>().unwrap();
    let api = app.resolve::<ApiClient>().unwrap();
    let tokens = app.resolve::<TokenManager>().unwrap();

    profile.auth.sign_in("secret");
    assert!(profile.auth.is_logged_in());
    assert_eq!(tokens.token().as_deref(), Some("secret"));

    api.on_response(401);
    assert!(!tokens.has_token());
    assert!(std::ptr::eq(api.tokens(), tokens.as_ref()));
}

#[test]
fn it_resolves_view_models_by_name() {
    let app = start();
    let retained = app.activity_retained().unwrap();
    let screen = retained.enter(VIEW_MODEL).unwrap();

    let by_name = screen.view_model_by_name("HomeViewModel").unwrap();
    let by_type = screen.resolve::<HomeViewModel>().unwrap();

    let by_name = by_name.downcast::<HomeViewModel>().unwrap();
    assert!(Arc::ptr_eq(&by_name, &by_type));

    let err = screen.view_model_by_name("MainViewModel").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Services Error: no binding for `MainViewModel` is reachable from scope `view_model`"
    );
}

#[test]
fn it_hides_view_models_from_sibling_scopes() {
    let app = start();
    let retained = app.activity_retained().unwrap();
    let activity = retained.enter(ACTIVITY).unwrap();

    let err = activity.resolve::<HomeViewModel>().unwrap_err();

    assert!(matches!(err, Error::Di(DiError::MissingBinding { .. })));
    assert!(app.resolve::<HomeViewModel>().is_err());
}

#[test]
fn it_rejects_scopes_out_of_hierarchy() {
    let app = start();

    let err = app.root().enter(VIEW_MODEL).unwrap_err();
    assert!(matches!(err, Error::Di(DiError::InvalidChildScope { .. })));

    let retained = app.activity_retained().unwrap();
    let activity = retained.enter(ACTIVITY).unwrap();
    let fragment = activity.enter(FRAGMENT).unwrap();
    let view = fragment.enter(VIEW_WITH_FRAGMENT).unwrap();

    assert_eq!(view.tag(), &VIEW_WITH_FRAGMENT);
    assert!(view.resolve::<QuantumBridgeService>().is_ok());
    assert!(app.service().unwrap().resolve::<AuthService>().is_ok());
    assert_eq!(app.service().unwrap().tag(), &SERVICE);
}

#[test]
fn it_notifies_when_retained_scope_is_cleared() {
    let app = start();
    let retained = app.activity_retained().unwrap();
    let screen = retained.enter(VIEW_MODEL).unwrap();
    let cleared = Arc::new(AtomicBool::new(false));

    let lifecycle = screen.lifecycle().unwrap();
    assert!(Arc::ptr_eq(&lifecycle, &retained.lifecycle().unwrap()));

    let flag = cleared.clone();
    lifecycle.add_on_cleared_listener(move || flag.store(true, Ordering::SeqCst)).unwrap();

    retained.close();

    assert!(cleared.load(Ordering::SeqCst));
    assert!(screen.is_closed());
    assert!(lifecycle.is_cleared());
    assert!(lifecycle.add_on_cleared_listener(|| {}).is_err());
}

#[test]
fn it_closes_every_scope_on_shutdown() {
    let app = start();
    let retained = app.activity_retained().unwrap();
    let screen = retained.enter(VIEW_MODEL).unwrap();

    let bridge = app.resolve::<QuantumBridgeService>().unwrap();
    bridge.set_connected(true);

    assert!(app.is_running());
    app.shutdown();

    assert!(!bridge.is_connected());
    assert!(screen.is_closed());
    assert!(matches!(
        screen.resolve::<HomeViewModel>(),
        Err(Error::Di(DiError::ScopeClosed(_)))
    ));
    assert!(matches!(
        retained.enter(VIEW_MODEL),
        Err(Error::Di(DiError::ScopeClosed(_)))
    ));
}

#[test]
fn it_starts_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "api_base_url": "http://localhost:8080", "debug": true }}"#).unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    let app = Application::start(config).unwrap();

    let api = app.resolve::<ApiClient>().unwrap();
    assert_eq!(api.endpoint("/auth/login"), "http://localhost:8080/auth/login");
    assert!(api.logs_bodies());
}

#[test]
fn it_refuses_to_start_with_invalid_config() {
    let config = AppConfig::default().with_api_base_url("ftp://example.com");

    let err = Application::start(config).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn it_registers_additional_services() {
    #[derive(Default)]
    struct NotificationService;

    let mut app = App::new(AppConfig::default());
    app.add_scoped::<NotificationService>(ACTIVITY);

    let app = app.start().unwrap();
    let activity = app.activity_retained().unwrap().enter(ACTIVITY).unwrap();

    assert!(activity.resolve::<NotificationService>().is_ok());
}

#[tokio::test]
async fn it_shares_singletons_across_tasks() {
    let app = Arc::new(start());

    let handles = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::task::spawn_blocking(move || {
                let retained = app.activity_retained().unwrap();
                let screen = retained.enter(VIEW_MODEL).unwrap();
                screen.resolve::<HomeViewModel>().unwrap().auth.clone()
            })
        })
        .collect::<Vec<_>>();

    let mut services = Vec::new();
    for handle in handles {
        services.push(handle.await.unwrap());
    }

    assert!(services.windows(2).all(|pair| Dc::ptr_eq(&pair[0], &pair[1])));
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn it_traces_scopes() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let app = App::new(AppConfig::default())
            .with_default_tracing()
            .start()
            .unwrap();
        let retained = app.activity_retained().unwrap();
        let screen = retained.enter(VIEW_MODEL).unwrap();
        screen.resolve::<HomeViewModel>().unwrap();
        app.shutdown();
    });

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("application started"));
    assert!(output.contains("entered scope"));
    assert!(output.contains("application shut down"));
}
