use ioc_runtime::{Bindings, ErrorKind, Ioc, IocError, Key};
use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[test]
fn singleton_factory_runs_exactly_once() {
    struct Engine {
        id: u32,
    }

    let constructions = Arc::new(AtomicU32::new(0));
    let counter = constructions.clone();
    let ioc = Ioc::new(move |b: &mut Bindings| {
        let counter = counter.clone();
        b.bind::<Engine, Engine>().provide::<Engine, _>(move |_| Engine {
            id: counter.fetch_add(1, Ordering::SeqCst),
        });
    });

    let first = ioc.resolve::<Engine>().unwrap();
    let second = ioc.resolve::<Engine>().unwrap();
    let third = ioc.resolve::<Engine>().unwrap();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert_eq!(first.id, 0);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));

    let stats = ioc.stats();
    assert_eq!(stats.constructions, 1);
    assert_eq!(stats.singleton_hits, 2);
    assert_eq!(stats.cached_singletons, 1);
}

#[test]
fn requested_types_sharing_an_implementation_share_its_instance() {
    trait Reader: Send + Sync {
        fn read(&self) -> &str;
    }
    trait Writer: Send + Sync {
        fn destination(&self) -> &str;
    }

    struct FileStore;
    impl Reader for FileStore {
        fn read(&self) -> &str {
            "contents"
        }
    }
    impl Writer for FileStore {
        fn destination(&self) -> &str {
            "disk"
        }
    }

    let ioc = Ioc::new(|b: &mut Bindings| {
        b.bind_trait::<dyn Reader, FileStore, _>(|a| a)
            .bind_trait::<dyn Writer, FileStore, _>(|a| a)
            .provide::<FileStore, _>(|_| FileStore);
    });

    let reader = ioc.resolve_trait::<dyn Reader>().unwrap();
    let writer = ioc.resolve_trait::<dyn Writer>().unwrap();

    assert_eq!(reader.read(), "contents");
    assert_eq!(writer.destination(), "disk");

    // The cache is keyed by the implementation, so both requested types
    // observe the same FileStore allocation.
    assert_eq!(
        Arc::as_ptr(&reader) as *const (),
        Arc::as_ptr(&writer) as *const ()
    );
    assert_eq!(ioc.stats().constructions, 1);
}

#[test]
fn marker_bindings_share_through_the_key_indexed_path() {
    struct Store;
    struct PrimaryStore;
    struct BackupStore;

    let ioc = Ioc::new(|b: &mut Bindings| {
        b.bind::<PrimaryStore, Store>()
            .bind::<BackupStore, Store>()
            .provide::<Store, _>(|_| Store);
    });

    let primary = ioc.resolve_key(Key::of::<PrimaryStore>()).unwrap();
    let backup = ioc.resolve_key(Key::of::<BackupStore>()).unwrap();
    assert!(Arc::ptr_eq(&primary, &backup));
    assert_eq!(ioc.stats().constructions, 1);
}

#[test]
fn unregistered_type_fails_without_touching_the_cache() {
    struct Registered;
    #[derive(Debug)]
    struct Unregistered;

    let ioc = Ioc::new(|b: &mut Bindings| {
        b.bind::<Registered, Registered>()
            .provide::<Registered, _>(|_| Registered);
    });

    let err = ioc.resolve::<Unregistered>().unwrap_err();
    match &err {
        IocError::NoProvider(name) => assert!(name.contains("Unregistered")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Resolution);

    let stats = ioc.stats();
    assert_eq!(stats.constructions, 0);
    assert_eq!(stats.cached_singletons, 0);
}

#[test]
fn mapping_without_accessor_names_the_implementation() {
    #[derive(Debug)]
    struct Api;
    struct HttpApi;

    let ioc = Ioc::new(|b: &mut Bindings| {
        // Provider mapping present, accessor for HttpApi forgotten.
        b.bind::<Api, HttpApi>();
    });

    match ioc.resolve::<Api>().unwrap_err() {
        IocError::MissingAccessor(name) => assert!(name.contains("HttpApi")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(ioc.stats().cached_singletons, 0);
}

#[test]
fn failing_accessor_surfaces_the_cause_and_caches_nothing() {
    #[derive(Debug)]
    struct Db;

    let ioc = Ioc::new(|b: &mut Bindings| {
        b.bind::<Db, Db>().try_provide::<Db, _, _>(|_| {
            Err::<Db, _>(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "db unreachable",
            ))
        });
    });

    let err = ioc.resolve::<Db>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resolution);
    match &err {
        IocError::Construction(name, _) => assert!(name.contains("Db")),
        other => panic!("unexpected error: {:?}", other),
    }
    let source = err.source().expect("construction fault attached");
    assert!(format!("{}", source).contains("db unreachable"));

    // Failure is terminal for the call but never cached as success.
    assert!(ioc.resolve::<Db>().is_err());
    assert_eq!(ioc.stats().cached_singletons, 0);
}

#[test]
fn mismatched_typed_resolution_is_reported() {
    struct Service;
    #[derive(Debug)]
    struct ServiceHandle;

    let ioc = Ioc::new(|b: &mut Bindings| {
        // ServiceHandle maps to Service, so a typed resolve of the handle
        // cannot produce a ServiceHandle value.
        b.bind::<ServiceHandle, Service>().provide::<Service, _>(|_| Service);
    });

    match ioc.resolve::<ServiceHandle>().unwrap_err() {
        IocError::ImplementationMismatch(name) => assert!(name.contains("ServiceHandle")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn accessors_resolve_their_own_dependencies() {
    struct Config {
        pool: u32,
    }
    struct Pool {
        size: u32,
    }

    let ioc = Ioc::new(|b: &mut Bindings| {
        b.bind::<Config, Config>()
            .provide::<Config, _>(|_| Config { pool: 8 });
        b.bind::<Pool, Pool>().try_provide::<Pool, _, IocError>(|ioc| {
            Ok(Pool {
                size: ioc.resolve::<Config>()?.pool,
            })
        });
    });

    let pool = ioc.resolve::<Pool>().unwrap();
    assert_eq!(pool.size, 8);
    assert_eq!(ioc.stats().constructions, 2);
}
