//! ModuleLoader behaviour against a mock backend and the built-in chain module.

use conduit_core::AudioFormat;
use conduit_modules::{
    Module, ModuleError, ModuleKind, ModuleLoader, ModuleMetadata, ModuleStatus, PluginLoader,
    StaticLoader,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    inits: AtomicUsize,
    deinits: AtomicUsize,
    drops: AtomicUsize,
}

struct MockModule {
    metadata: ModuleMetadata,
    counters: Arc<Counters>,
    active: bool,
}

impl Module for MockModule {
    fn metadata(&self) -> &ModuleMetadata {
        &self.metadata
    }

    fn init(&mut self, config: &str) -> Result<(), ModuleError> {
        if config == "fail" {
            return Err(ModuleError::InitFailed {
                id: self.metadata.id.clone(),
                code: -libc::ENOMEM,
                reason: "no memory".into(),
            });
        }
        self.counters.inits.fetch_add(1, Ordering::SeqCst);
        self.active = true;
        Ok(())
    }

    fn deinit(&mut self) {
        self.counters.deinits.fetch_add(1, Ordering::SeqCst);
        self.active = false;
    }

    fn process_audio(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        _format: &AudioFormat,
    ) -> Result<usize, ModuleError> {
        for (o, i) in output.iter_mut().zip(input) {
            *o = !i;
        }
        Ok(input.len().min(output.len()))
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_parameter(&mut self, key: &str, value: &str) -> Result<(), ModuleError> {
        Err(ModuleError::InvalidParameter {
            key: key.into(),
            value: value.into(),
        })
    }

    fn get_parameter(&self, _key: &str) -> Option<String> {
        None
    }
}

impl Drop for MockModule {
    fn drop(&mut self) {
        self.counters.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Opens `mock/<kind>/<id>` paths.
struct MockLoader {
    counters: Arc<Counters>,
}

impl PluginLoader for MockLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn Module>, ModuleError> {
        let text = path.to_string_lossy();
        let mut parts = text.split('/');
        let (Some("mock"), Some(kind), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ModuleError::LoadFailed {
                path: text.into_owned(),
                reason: "not a mock path".into(),
            });
        };
        let kind = match kind {
            "in" => ModuleKind::AudioInput,
            "out" => ModuleKind::AudioOutput,
            "fx" => ModuleKind::AudioProcessing,
            _ => return Err(ModuleError::InvalidFormat(format!("kind {kind}"))),
        };
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockModule {
            metadata: ModuleMetadata {
                id: id.into(),
                name: format!("Mock {id}"),
                description: "test module".into(),
                version: "0.0.1".into(),
                kind,
            },
            counters: Arc::clone(&self.counters),
            active: false,
        }))
    }
}

fn mock_loader() -> (ModuleLoader, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let loader = ModuleLoader::with_capacity(
        MockLoader {
            counters: Arc::clone(&counters),
        },
        1,
    );
    (loader, counters)
}

#[test]
fn unload_twice_is_not_found_and_deinits_once() {
    let (mut loader, counters) = mock_loader();
    loader.load("mock/fx/gain", "").unwrap();
    assert!(loader.module("gain").unwrap().is_active());

    loader.unload("gain").unwrap();
    let err = loader.unload("gain").unwrap_err();
    assert_eq!(err, ModuleError::NotFound("gain".into()));
    assert_eq!(err.status(), ModuleStatus::LoadFailed);
    assert_eq!(err.errno(), -libc::ENOENT);

    assert_eq!(counters.deinits.load(Ordering::SeqCst), 1);
    assert_eq!(counters.drops.load(Ordering::SeqCst), 1);
}

#[test]
fn grows_past_initial_capacity_and_filters_by_type() {
    let (mut loader, _) = mock_loader();
    for path in ["mock/in/mic", "mock/fx/eq", "mock/out/dac", "mock/fx/comp"] {
        loader.load(path, "").unwrap();
    }
    assert_eq!(loader.len(), 4);

    let mut fx: Vec<_> = loader
        .modules_by_type(ModuleKind::AudioProcessing)
        .map(|m| m.id.as_str())
        .collect();
    fx.sort_unstable();
    assert_eq!(fx, ["comp", "eq"]);
    assert_eq!(loader.modules_by_type(ModuleKind::Control).count(), 0);

    // swap-remove keeps the rest reachable
    loader.unload("mic").unwrap();
    for id in ["eq", "dac", "comp"] {
        assert!(loader.module(id).is_some());
    }
}

#[test]
fn rejected_modules_are_released_without_deinit() {
    let (mut loader, counters) = mock_loader();
    loader.load("mock/fx/gain", "").unwrap();

    let dup = loader.load("mock/fx/gain", "").unwrap_err();
    assert_eq!(dup.status(), ModuleStatus::AlreadyLoaded);

    let failed = loader.load("mock/fx/other", "fail").unwrap_err();
    assert_eq!(failed.status(), ModuleStatus::InitFailed);
    assert_eq!(failed.errno(), -libc::ENOMEM);

    let bad = loader.load("mock/xx/weird", "").unwrap_err();
    assert_eq!(bad.status(), ModuleStatus::InvalidFormat);

    assert_eq!(counters.opened.load(Ordering::SeqCst), 3);
    assert_eq!(counters.inits.load(Ordering::SeqCst), 1);
    assert_eq!(counters.deinits.load(Ordering::SeqCst), 0);
    assert_eq!(counters.drops.load(Ordering::SeqCst), 2);
    assert_eq!(loader.len(), 1);
}

#[test]
fn cleanup_is_idempotent_and_runs_on_drop() {
    let (mut loader, counters) = mock_loader();
    loader.load("mock/in/a", "").unwrap();
    loader.load("mock/in/b", "").unwrap();
    loader.cleanup();
    loader.cleanup();
    assert!(loader.is_empty());
    assert_eq!(counters.deinits.load(Ordering::SeqCst), 2);

    loader.load("mock/in/c", "").unwrap();
    drop(loader);
    assert_eq!(counters.deinits.load(Ordering::SeqCst), 3);
    assert_eq!(counters.drops.load(Ordering::SeqCst), 3);
}

#[test]
fn module_mut_processes_audio() {
    let (mut loader, _) = mock_loader();
    loader.load("mock/fx/invert", "").unwrap();
    let format = AudioFormat {
        sample_rate: 48000,
        channels: 1,
        bit_depth: 16,
        buffer_size: 2,
    };
    let mut out = [0u8; 4];
    let n = loader
        .module_mut("invert")
        .unwrap()
        .process_audio(&[0, 1, 2, 3], &mut out, &format)
        .unwrap();
    assert_eq!(n, 4);
    assert_eq!(out, [255, 254, 253, 252]);
}

#[test]
fn builtin_chain_through_loader() {
    let mut loader = ModuleLoader::new(StaticLoader::new());
    let meta = loader
        .load("builtin:chain", "channels=1; effect=equalizer; gain=2.0")
        .unwrap();
    assert_eq!(meta.id, "chain");

    let format = AudioFormat {
        sample_rate: 48000,
        channels: 1,
        bit_depth: 32,
        buffer_size: 2,
    };
    let input: Vec<u8> = [0.25f32, -0.75].iter().flat_map(|s| s.to_le_bytes()).collect();
    let mut output = vec![0u8; input.len()];
    let module = loader.module_mut("chain").unwrap();
    module.process_audio(&input, &mut output, &format).unwrap();

    let first = f32::from_le_bytes([output[0], output[1], output[2], output[3]]);
    let second = f32::from_le_bytes([output[4], output[5], output[6], output[7]]);
    assert!((first - 0.5).abs() < 1e-6);
    // doubled then clamped to full scale
    assert_eq!(second, -1.0);

    module.set_parameter("gain", "1.0").unwrap();
    assert_eq!(module.get_parameter("gain").as_deref(), Some("1"));
}
