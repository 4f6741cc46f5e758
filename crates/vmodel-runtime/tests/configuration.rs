#![forbid(unsafe_code)]

//! Integration tests: global configuration and per-binding snapshots.
//!
//! Every test that touches the global configuration holds a [`GlobalReset`]
//! so the thread-local defaults are restored even when an assertion fails.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use vmodel_core::{
    MemoryRecord, ObservableRecord, OverrideContext, RecordEvent, TestDeclaration, is_truthy,
    to_number,
};
use vmodel_runtime::{
    ConfigurationOptions, ValidityConfig, bind, configure, current_configuration,
    reset_configuration,
};

struct GlobalReset;

impl GlobalReset {
    fn with(options: ConfigurationOptions) -> Self {
        reset_configuration();
        configure(options);
        Self
    }
}

impl Drop for GlobalReset {
    fn drop(&mut self) {
        reset_configuration();
    }
}

fn person() -> Rc<MemoryRecord> {
    Rc::new(
        MemoryRecord::with_values([("name", json!("")), ("age", json!(0))]).with_declaration(
            "validation",
            TestDeclaration::builder()
                .attribute("name", |t| {
                    t.test("required", |v, _| v.as_str() != Some(""))
                        .test("length", |v, _| {
                            v.as_str().is_some_and(|s| s.chars().count() >= 3)
                        })
                })
                .attribute("age", |t| {
                    t.test("required", |v, _| is_truthy(v))
                        .test("positive", |v, _| to_number(v) > 0.0)
                })
                .build(),
        ),
    )
}

// ============================================================================
// lazy
// ============================================================================

#[test]
fn lazy_true_skips_after_first_failure() {
    let _reset = GlobalReset::with(ConfigurationOptions::new().lazy(true));
    let model = person();
    let _binding = bind(&model).unwrap();

    assert_eq!(model.get_bool("$invalid"), Some(true));
    assert_eq!(model.get_bool("$invalid/name"), Some(true));
    assert_eq!(model.get_bool("$invalid/name/required"), Some(true));
    assert_eq!(model.get_bool("$invalid/name/length"), Some(false));
    assert_eq!(model.get_bool("$invalid/age"), Some(true));
    assert_eq!(model.get_bool("$invalid/age/required"), Some(true));
    assert_eq!(model.get_bool("$invalid/age/positive"), Some(false));
}

#[test]
fn lazy_false_runs_every_test() {
    let _reset = GlobalReset::with(ConfigurationOptions::new().lazy(false));
    let model = person();
    let _binding = bind(&model).unwrap();

    assert_eq!(model.get_bool("$invalid"), Some(true));
    assert_eq!(model.get_bool("$invalid/name"), Some(true));
    assert_eq!(model.get_bool("$invalid/name/required"), Some(true));
    assert_eq!(model.get_bool("$invalid/name/length"), Some(true));
    assert_eq!(model.get_bool("$invalid/age"), Some(true));
    assert_eq!(model.get_bool("$invalid/age/required"), Some(true));
    assert_eq!(model.get_bool("$invalid/age/positive"), Some(true));
}

// ============================================================================
// separator
// ============================================================================

#[test]
fn separator_shapes_record_keys() {
    let _reset = GlobalReset::with(ConfigurationOptions::new().separator("#"));
    let model = person();
    let _binding = bind(&model).unwrap();

    assert_eq!(model.get_bool("$valid"), Some(false));
    assert_eq!(model.get_bool("$invalid"), Some(true));
    assert_eq!(model.get("$valid/name"), None);
    assert_eq!(model.get("$invalid/name"), None);
    assert_eq!(model.get_bool("$valid#name"), Some(false));
    assert_eq!(model.get_bool("$invalid#name"), Some(true));
    assert_eq!(model.get_bool("$valid#name#required"), Some(false));
    assert_eq!(model.get_bool("$invalid#name#required"), Some(true));
}

#[test]
fn separator_shapes_event_names() {
    let _reset = GlobalReset::with(ConfigurationOptions::new().separator("#"));
    let model = person();
    let binding = bind(&model).unwrap();
    let separator = binding.configuration().separator;
    let names = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&names);
    model.on(Rc::new(move |event: &RecordEvent| {
        if let Some(event) = event.as_validity() {
            log.borrow_mut().push(event.name(&separator));
        }
    }));

    model.set("name", json!("James Cracknell"));

    let names = names.borrow();
    assert!(names.iter().any(|n| n == "valid:name#required"));
    assert!(!names.iter().any(|n| n == "valid:name/required"));
}

// ============================================================================
// events, modelEvents, validityModelEvents
// ============================================================================

fn validity_event_count(record: &MemoryRecord) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&count);
    record.on(Rc::new(move |event: &RecordEvent| {
        if event.as_validity().is_some() {
            *counter.borrow_mut() += 1;
        }
    }));
    count
}

#[test]
fn events_false_silences_all_targets() {
    let _reset = GlobalReset::with(ConfigurationOptions::new().events(false));
    let model = person();
    let _binding = bind(&model).unwrap();
    let count = validity_event_count(&model);

    model.set_many([("name", json!("Ada")), ("age", json!(36))]);
    assert_eq!(model.get_bool("$valid"), Some(true));
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn both_target_switches_off_silences_same_record() {
    let _reset = GlobalReset::with(
        ConfigurationOptions::new()
            .model_events(false)
            .validity_model_events(false),
    );
    let model = person();
    let _binding = bind(&model).unwrap();
    let count = validity_event_count(&model);

    model.set("age", json!(4));
    assert_eq!(model.get_bool("$valid/age"), Some(true));
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn model_events_alone_reach_same_record() {
    let _reset = GlobalReset::with(ConfigurationOptions::new().validity_model_events(false));
    let model = person();
    let _binding = bind(&model).unwrap();
    let count = validity_event_count(&model);

    model.set("age", json!(4));
    assert_eq!(*count.borrow(), 2, "age/required and age");
}

// ============================================================================
// Global state and snapshots
// ============================================================================

#[test]
fn configure_merges_shallowly() {
    let _reset = GlobalReset::with(ConfigurationOptions::new().lazy(false));
    configure(ConfigurationOptions::new().separator("::"));

    let current = current_configuration();
    assert!(!current.lazy);
    assert_eq!(current.separator, "::");
    assert!(current.events);
    assert_eq!(current.validation_property, "validation");
}

#[test]
fn existing_bindings_keep_their_snapshot() {
    let _reset = GlobalReset::with(ConfigurationOptions::new());
    let model = person();
    let binding = bind(&model).unwrap();

    configure(ConfigurationOptions::new().separator("#"));
    model.set("age", json!(4));
    assert_eq!(model.get_bool("$valid/age"), Some(true));
    assert_eq!(model.get("$valid#age"), None);

    binding.refresh_configuration().unwrap();
    binding.validate();
    assert_eq!(model.get_bool("$valid#age"), Some(true));
}

#[test]
fn refresh_rejects_unusable_global() {
    let _reset = GlobalReset::with(ConfigurationOptions::new());
    let model = person();
    let binding = bind(&model).unwrap();

    configure(ConfigurationOptions::new().validation_property(""));
    assert!(binding.refresh_configuration().is_err());
    assert_eq!(binding.configuration().validation_property, "validation");
}

#[test]
fn global_override_applies_to_new_bindings() {
    let _reset = GlobalReset::with(
        ConfigurationOptions::new()
            .validity_override(|c: &OverrideContext<'_>| c.test_name != "length" && c.validity),
    );
    let model = Rc::new(
        MemoryRecord::with_values([("name", json!("James"))])
            .with_declaration(
                "validation",
                TestDeclaration::builder()
                    .attribute("name", |t| t.test("length", |_, _| true))
                    .build(),
            ),
    );
    let _binding = bind(&model).unwrap();
    assert_eq!(model.get_bool("$invalid/name/length"), Some(true));

    reset_configuration();
    let other = person();
    let _other_binding = bind(&other).unwrap();
    assert_eq!(other.get_bool("$valid/name/length"), Some(true));
}

#[test]
fn explicit_config_ignores_global() {
    let _reset = GlobalReset::with(ConfigurationOptions::new().separator("#"));
    let model = person();
    let sink = Rc::new(MemoryRecord::new());
    let _binding =
        vmodel_runtime::bind_with_config(&model, &sink, ValidityConfig::default()).unwrap();

    assert_eq!(sink.get_bool("$valid/name"), Some(false));
    assert_eq!(sink.get("$valid#name"), None);
}
