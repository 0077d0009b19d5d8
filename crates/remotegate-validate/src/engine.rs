use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use remotegate_value::{CacheKey, Value};

use crate::builtins;
use crate::check::{ArgumentRejected, CheckSpec, Verdict};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::schema;

/// A registered validator: `(value, params) -> bool`.
pub type Predicate = Arc<dyn Fn(&Value, &[Value]) -> bool + Send + Sync>;

static NIL: Value = Value::Nil;

/// Name-keyed registry of validators with per-validator memoization.
///
/// Re-registering a name replaces the predicate but keeps every verdict
/// already cached for that name.
pub struct ValidationEngine {
    validators: RwLock<HashMap<String, Predicate>>,
    cache: Mutex<HashMap<String, HashMap<CacheKey, Verdict>>>,
    config: EngineConfig,
}

impl ValidationEngine {
    /// Create an engine with the built-in validators and default config.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with the built-in validators and explicit config.
    pub fn with_config(config: EngineConfig) -> Self {
        let engine = Self::empty_with_config(config);
        builtins::install(&engine);
        engine
    }

    /// Create an engine with no validators registered.
    pub fn empty() -> Self {
        Self::empty_with_config(EngineConfig::default())
    }

    /// Create an engine with no validators and explicit config.
    pub fn empty_with_config(config: EngineConfig) -> Self {
        Self {
            validators: RwLock::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Register `predicate` under `name`, replacing any previous predicate.
    pub fn register<F>(&self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.register_predicate(name, Arc::new(predicate));
    }

    /// Register an already shared predicate under `name`.
    pub fn register_predicate(&self, name: impl Into<String>, predicate: Predicate) {
        let name = name.into();
        if self.validators.write().insert(name.clone(), predicate).is_some() {
            tracing::debug!(validator = %name, "validator replaced; cached verdicts kept");
        }
    }

    /// Register a JSON Schema validator from a JSON string.
    pub fn register_schema(&self, name: impl Into<String>, schema_json: &str) -> Result<()> {
        let schema: serde_json::Value = serde_json::from_str(schema_json)?;
        self.register_schema_value(name, &schema)
    }

    /// Register a JSON Schema validator from a JSON value.
    ///
    /// The validated value is converted with [`Value::to_json`]; values
    /// with no JSON form are rejected.
    pub fn register_schema_value(
        &self,
        name: impl Into<String>,
        schema: &serde_json::Value,
    ) -> Result<()> {
        let name = name.into();
        let predicate = schema::compile(&name, schema, self.config.strict_schemas)?;
        self.register_predicate(name, predicate);
        Ok(())
    }

    /// Run validator `name` against `value` and `params`.
    ///
    /// An unregistered name yields `false`, the same as a rejection; use
    /// [`check`](Self::check) to tell the two apart.
    pub fn validate(&self, name: &str, value: &Value, params: &[Value]) -> bool {
        self.check(name, value, params).passed()
    }

    /// Run validator `name` and report the three-way verdict.
    pub fn check(&self, name: &str, value: &Value, params: &[Value]) -> Verdict {
        let key = CacheKey::new(value, params);

        if self.config.memoize {
            if let Some(verdict) = self.cached(name, &key) {
                tracing::trace!(validator = name, %verdict, "cached verdict");
                return verdict;
            }
        }

        let predicate = self.validators.read().get(name).cloned();
        let verdict = match predicate {
            Some(predicate) if predicate(value, params) => Verdict::Passed,
            Some(_) => Verdict::Rejected,
            None => Verdict::Unregistered,
        };

        if !self.config.memoize {
            if verdict == Verdict::Unregistered {
                tracing::warn!(validator = name, "validator not found");
            }
            return verdict;
        }

        // Predicates run unlocked; the first verdict stored for a key wins.
        let (stored, inserted) = {
            let mut cache = self.cache.lock();
            match cache.entry(name.to_string()).or_default().entry(key) {
                Entry::Occupied(entry) => (*entry.get(), false),
                Entry::Vacant(entry) => (*entry.insert(verdict), true),
            }
        };

        if inserted && stored == Verdict::Unregistered {
            tracing::warn!(validator = name, "validator not found");
        }
        stored
    }

    /// Validate `args` positionally against `checks`.
    ///
    /// Stops at the first failing position. Arguments beyond the checks are
    /// not validated; checks beyond the arguments validate nil.
    pub fn check_arguments(
        &self,
        checks: &[CheckSpec],
        args: &[Value],
    ) -> std::result::Result<(), ArgumentRejected> {
        for (position, check) in checks.iter().enumerate() {
            let arg = args.get(position).unwrap_or(&NIL);
            let verdict = self.check(&check.validator, arg, &check.params);
            if !verdict.passed() {
                return Err(ArgumentRejected {
                    index: position + 1,
                    validator: check.validator.clone(),
                    verdict,
                });
            }
        }
        Ok(())
    }

    /// Check if a validator is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.validators.read().contains_key(name)
    }

    /// Registered validator names, sorted.
    pub fn validators(&self) -> Vec<String> {
        let mut names: Vec<String> = self.validators.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of cached verdicts for validator `name`.
    pub fn cached_entries(&self, name: &str) -> usize {
        self.cache.lock().get(name).map_or(0, HashMap::len)
    }

    /// Get engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn cached(&self, name: &str, key: &CacheKey) -> Option<Verdict> {
        self.cache
            .lock()
            .get(name)
            .and_then(|entries| entries.get(key))
            .copied()
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("validators", &self.validators.read().len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use remotegate_value::args;

    use super::*;
    use crate::builtins::{IS_IN_RANGE, IS_NUMBER, IS_POSITIVE};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
        (result, logs)
    }

    #[test]
    fn builtin_range_check_passes() {
        let engine = ValidationEngine::new();
        assert!(engine.validate(IS_IN_RANGE, &Value::from(5), &args![1, 10]));
        assert!(!engine.validate(IS_IN_RANGE, &Value::from(11), &args![1, 10]));
    }

    #[test]
    fn re_registration_keeps_stale_verdicts() {
        let engine = ValidationEngine::new();
        assert!(engine.validate(IS_IN_RANGE, &Value::from(5), &args![1, 10]));

        engine.register(IS_IN_RANGE, |_: &Value, _: &[Value]| false);
        assert!(engine.validate(IS_IN_RANGE, &Value::from(5), &args![1, 10]));

        // New keys see the replacement predicate.
        assert!(!engine.validate(IS_IN_RANGE, &Value::from(6), &args![1, 10]));
    }

    #[test]
    fn predicate_runs_once_per_key() {
        let engine = ValidationEngine::empty();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        engine.register("isEven", move |value: &Value, _: &[Value]| {
            counter.fetch_add(1, Ordering::SeqCst);
            value.as_f64().is_some_and(|n| n % 2.0 == 0.0)
        });

        for _ in 0..3 {
            assert!(engine.validate("isEven", &Value::from(4), &[]));
        }
        assert!(!engine.validate("isEven", &Value::from(3), &[]));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(engine.cached_entries("isEven"), 2);
    }

    #[test]
    fn memoization_can_be_disabled() {
        let engine = ValidationEngine::empty_with_config(EngineConfig {
            memoize: false,
            ..EngineConfig::default()
        });
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        engine.register("always", move |_: &Value, _: &[Value]| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        engine.validate("always", &Value::Nil, &[]);
        engine.validate("always", &Value::Nil, &[]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(engine.cached_entries("always"), 0);
    }

    #[test]
    fn unknown_validator_is_false_and_logged_once_per_key() {
        let engine = ValidationEngine::new();
        let (results, logs) = capture_logs(|| {
            [
                engine.validate("notARealCheck", &Value::from(5), &[]),
                engine.validate("notARealCheck", &Value::from(5), &[]),
                engine.validate("notARealCheck", &Value::from(6), &[]),
            ]
        });

        assert_eq!(results, [false, false, false]);
        assert_eq!(logs.matches("validator not found").count(), 2);
        assert!(logs.contains("notARealCheck"));
    }

    #[test]
    fn check_distinguishes_unregistered_from_rejected() {
        let engine = ValidationEngine::new();
        assert_eq!(
            engine.check("notARealCheck", &Value::from(5), &[]),
            Verdict::Unregistered
        );
        assert_eq!(
            engine.check(IS_POSITIVE, &Value::from(-5), &[]),
            Verdict::Rejected
        );
        // The boolean surface cannot tell them apart.
        assert_eq!(
            engine.validate("notARealCheck", &Value::from(5), &[]),
            engine.validate(IS_POSITIVE, &Value::from(-5), &[])
        );
    }

    #[test]
    fn unregistered_verdict_stays_cached_after_registration() {
        let engine = ValidationEngine::empty();
        assert!(!engine.validate("late", &Value::from(1), &[]));

        engine.register("late", |_: &Value, _: &[Value]| true);
        assert_eq!(engine.check("late", &Value::from(1), &[]), Verdict::Unregistered);
        assert_eq!(engine.check("late", &Value::from(2), &[]), Verdict::Passed);
    }

    #[test]
    fn cache_is_scoped_per_validator() {
        let engine = ValidationEngine::empty();
        engine.register("yes", |_: &Value, _: &[Value]| true);
        engine.register("no", |_: &Value, _: &[Value]| false);

        assert!(engine.validate("yes", &Value::from(1), &[]));
        assert!(!engine.validate("no", &Value::from(1), &[]));
        assert_eq!(engine.cached_entries("yes"), 1);
        assert_eq!(engine.cached_entries("no"), 1);
    }

    #[test]
    fn delimiter_bearing_strings_do_not_share_verdicts() {
        let engine = ValidationEngine::empty();
        engine.register("argCount", |_: &Value, params: &[Value]| params.is_empty());

        assert!(engine.validate("argCount", &Value::from("a|b"), &[]));
        assert!(!engine.validate("argCount", &Value::from("a"), &args!["b"]));
    }

    #[test]
    fn check_arguments_short_circuits_with_one_based_index() {
        let engine = ValidationEngine::new();
        let checks = [CheckSpec::new(IS_NUMBER), CheckSpec::new(IS_POSITIVE)];

        assert_eq!(engine.check_arguments(&checks, &args![5, 3]), Ok(()));

        let rejected = engine
            .check_arguments(&checks, &args![5, -1])
            .expect_err("second argument should fail");
        assert_eq!(rejected.index, 2);
        assert_eq!(rejected.validator, IS_POSITIVE);
        assert_eq!(rejected.verdict, Verdict::Rejected);
        assert_eq!(engine.cached_entries(IS_NUMBER), 1);
    }

    #[test]
    fn check_arguments_stops_before_later_positions() {
        let engine = ValidationEngine::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        engine.register("counted", move |_: &Value, _: &[Value]| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        let checks = [CheckSpec::new(IS_POSITIVE), CheckSpec::new("counted")];
        assert!(engine.check_arguments(&checks, &args![-1, 2]).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn check_arguments_validates_prefix_and_missing_as_nil() {
        let engine = ValidationEngine::new();

        let prefix = [CheckSpec::new(IS_NUMBER)];
        assert!(engine
            .check_arguments(&prefix, &args![1, "extra", false])
            .is_ok());

        let longer = [CheckSpec::new(IS_NUMBER), CheckSpec::new(IS_NUMBER)];
        let rejected = engine.check_arguments(&longer, &args![1]).unwrap_err();
        assert_eq!(rejected.index, 2);

        assert!(engine.check_arguments(&[], &args![1, 2]).is_ok());
    }

    #[test]
    fn check_arguments_reports_unregistered_validators() {
        let engine = ValidationEngine::new();
        let rejected = engine
            .check_arguments(&[CheckSpec::new("missing")], &args![1])
            .unwrap_err();
        assert_eq!(rejected.index, 1);
        assert_eq!(rejected.verdict, Verdict::Unregistered);
    }

    #[test]
    fn schema_validator_registers_and_validates() {
        let engine = ValidationEngine::new();
        engine
            .register_schema(
                "isProfile",
                r#"{"type":"object","properties":{"id":{"type":"integer"}},"required":["id"]}"#,
            )
            .unwrap();

        let good = Value::from(serde_json::json!({"id": 3}));
        let bad = Value::from(serde_json::json!({"id": "three"}));
        assert!(engine.validate("isProfile", &good, &[]));
        assert!(!engine.validate("isProfile", &bad, &[]));
        assert!(!engine.validate("isProfile", &Value::from(f64::NAN), &[]));
    }

    #[test]
    fn invalid_schema_json_fails() {
        let engine = ValidationEngine::new();
        assert!(matches!(
            engine.register_schema("broken", "not-json"),
            Err(crate::ValidateError::InvalidJson(_))
        ));
        assert!(!engine.is_registered("broken"));
    }

    #[test]
    fn signed_zeros_are_validated_separately() {
        let engine = ValidationEngine::empty();
        engine.register("isSignNegative", |value: &Value, _: &[Value]| {
            value.as_f64().is_some_and(f64::is_sign_negative)
        });

        assert!(!engine.validate("isSignNegative", &Value::from(0.0), &[]));
        assert!(engine.validate("isSignNegative", &Value::from(-0.0), &[]));
        assert_eq!(engine.cached_entries("isSignNegative"), 2);
    }

    #[test]
    fn validators_are_listed_sorted() {
        let engine = ValidationEngine::empty();
        engine.register("b", |_: &Value, _: &[Value]| true);
        engine.register("a", |_: &Value, _: &[Value]| true);
        assert_eq!(engine.validators(), vec!["a".to_string(), "b".to_string()]);
        assert!(ValidationEngine::new().is_registered(IS_NUMBER));
    }

    #[test]
    fn concurrent_first_use_logs_once() {
        let engine = Arc::new(ValidationEngine::empty());
        let (_, logs) = capture_logs(|| {
            let dispatch = tracing::dispatcher::get_default(Clone::clone);
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let engine = Arc::clone(&engine);
                    let dispatch = dispatch.clone();
                    std::thread::spawn(move || {
                        tracing::dispatcher::with_default(&dispatch, || {
                            engine.validate("ghost", &Value::from(1), &[])
                        })
                    })
                })
                .collect();
            for handle in handles {
                assert!(!handle.join().expect("validator thread should finish"));
            }
        });
        assert_eq!(logs.matches("validator not found").count(), 1);
    }
}
