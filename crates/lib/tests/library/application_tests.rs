//! End-to-end contribution scenarios.

use std::io::Write;
use std::sync::{Arc, Mutex};

use libbs::consts::APPLICATION_ZIP;
use libbs::execute::Executor;
use libbs::{
  Application, ApplicationError, BuildpackPlan, BuildpackPlanEntry, Cache, LayerContributor, Layers, Logger,
};
use toml::{Table, Value};

use super::common::{RecordedExecution, RecordingExecutor, TestEnv, resolver, stub_application_jar, write};

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

fn application<'a>(
  env: &TestEnv,
  pattern: &str,
  executor: impl Executor + 'static,
  expected_metadata: Table,
  logger: Logger,
  plan: &'a mut BuildpackPlan,
) -> Application<'a> {
  Application {
    application_path: env.application(),
    arguments: vec!["test-argument".to_string()],
    artifact_resolver: resolver(pattern),
    cache: Cache::new(env.cache()),
    command: "test-command".to_string(),
    executor: Box::new(executor),
    layer_contributor: LayerContributor::new("test", expected_metadata),
    logger,
    plan,
  }
}

fn expected_plan() -> BuildpackPlan {
  let mut dependency = Table::new();
  dependency.insert("name".to_string(), Value::String("test-file".to_string()));
  dependency.insert("version".to_string(), Value::String("1.1.1".to_string()));
  dependency.insert("sha256".to_string(), Value::String(EMPTY_SHA256.to_string()));

  let mut entry = BuildpackPlanEntry::new("build-dependencies");
  entry
    .metadata
    .insert("dependencies".to_string(), Value::Array(vec![Value::Table(dependency)]));
  entry
    .metadata
    .insert("layer".to_string(), Value::String("cache".to_string()));

  BuildpackPlan { entries: vec![entry] }
}

#[test]
fn contributes_layer() {
  let env = TestEnv::new();
  env.write_source("stub-application.jar", stub_application_jar());
  write(&env.cache().join("test-file-1.1.1.jar"), b"");

  let executor = RecordingExecutor::default();
  let mut plan = BuildpackPlan::default();
  let layer = Layers::new(env.layers()).layer("test-layer").unwrap();

  let layer = application(&env, "*", executor.clone(), Table::new(), Logger::discard(), &mut plan)
    .contribute(layer)
    .unwrap();

  assert!(layer.types.cache);

  assert_eq!(
    executor.calls(),
    vec![RecordedExecution {
      command: "test-command".to_string(),
      args: vec!["test-argument".to_string()],
      dir: env.application(),
    }]
  );

  assert!(layer.path.join(APPLICATION_ZIP).is_file());
  assert!(!env.application().join("stub-application.jar").exists());
  assert!(env.application().join("fixture-marker").is_file());

  assert_eq!(plan, expected_plan());
}

#[test]
fn reuses_cached_layer_without_building() {
  let env = TestEnv::new();
  write(&env.cache().join("test-file-1.1.1.jar"), b"");

  let mut expected = Table::new();
  expected.insert("arguments".to_string(), Value::Array(vec![Value::String("test-argument".to_string())]));

  // First build produces the artifact.
  env.write_source("pom.xml", "<project/>");
  let first = RecordingExecutor::producing("target/app-1.0.jar", stub_application_jar());
  let mut plan = BuildpackPlan::default();
  application(&env, "target/*.jar", first.clone(), expected.clone(), Logger::discard(), &mut plan)
    .contribute(Layers::new(env.layers()).layer("application").unwrap())
    .unwrap();
  assert_eq!(first.calls().len(), 1);

  // Next build starts from a fresh checkout of the same sources.
  for entry in std::fs::read_dir(env.application()).unwrap() {
    let path = entry.unwrap().path();
    if path.is_dir() {
      std::fs::remove_dir_all(path).unwrap();
    } else {
      std::fs::remove_file(path).unwrap();
    }
  }
  env.write_source("pom.xml", "<project/>");

  let second = RecordingExecutor::default();
  let mut plan = BuildpackPlan::default();
  let layer = application(&env, "target/*.jar", second.clone(), expected.clone(), Logger::discard(), &mut plan)
    .contribute(Layers::new(env.layers()).layer("application").unwrap())
    .unwrap();

  assert!(second.calls().is_empty());
  assert!(layer.types.cache);
  assert_eq!(layer.metadata, expected);
  assert!(!env.application().join("pom.xml").exists());
  assert!(env.application().join("fixture-marker").is_file());
  assert_eq!(plan, expected_plan());
}

#[test]
fn changed_metadata_triggers_rebuild() {
  let env = TestEnv::new();
  let layers = Layers::new(env.layers());

  let mut stale = layers.layer("application").unwrap();
  stale.metadata.insert("java-version".to_string(), Value::String("11".to_string()));
  stale.write().unwrap();
  write(&stale.path.join(APPLICATION_ZIP), b"stale");

  let mut expected = Table::new();
  expected.insert("java-version".to_string(), Value::String("17".to_string()));

  let executor = RecordingExecutor::producing("target/app.jar", stub_application_jar());
  let mut plan = BuildpackPlan::default();
  let layer = application(&env, "target/*.jar", executor.clone(), expected.clone(), Logger::discard(), &mut plan)
    .contribute(layers.layer("application").unwrap())
    .unwrap();

  assert_eq!(executor.calls().len(), 1);
  assert_eq!(layer.metadata, expected);
  assert_eq!(
    std::fs::read(layer.path.join(APPLICATION_ZIP)).unwrap(),
    stub_application_jar()
  );
}

#[test]
fn unresolvable_artifact_leaves_source_in_place() {
  let env = TestEnv::new();
  env.write_source("a.jar", "");
  env.write_source("b.jar", "");

  let mut plan = BuildpackPlan::default();
  let layers = Layers::new(env.layers());
  let result = application(&env, "*.jar", RecordingExecutor::default(), Table::new(), Logger::discard(), &mut plan)
    .contribute(layers.layer("application").unwrap());

  let err = result.unwrap_err();
  assert!(matches!(err, ApplicationError::ResolveArtifact(_)));
  assert!(err.to_string().starts_with("unable to resolve artifact"));

  assert!(env.application().join("a.jar").exists());
  assert!(env.application().join("b.jar").exists());
  assert!(plan.entries.is_empty());
  assert!(!layers.layer("application").unwrap().metadata_file().exists());
}

#[test]
fn build_output_goes_to_the_log() {
  #[derive(Clone, Default)]
  struct Buffer(Arc<Mutex<Vec<u8>>>);

  impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  let env = TestEnv::new();
  let buffer = Buffer::default();
  let executor = RecordingExecutor {
    output: Some("[INFO] BUILD SUCCESS\n".to_string()),
    ..RecordingExecutor::producing("target/app.jar", stub_application_jar())
  };

  let mut plan = BuildpackPlan::default();
  application(&env, "target/*.jar", executor, Table::new(), Logger::new(buffer.clone()), &mut plan)
    .contribute(Layers::new(env.layers()).layer("application").unwrap())
    .unwrap();

  let log = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
  assert!(log.contains("test: Contributing to layer"));
  assert!(log.contains("    Executing test-command test-argument"));
  assert!(log.contains("      [INFO] BUILD SUCCESS"));
  assert!(log.contains("Removing source code"));
}

#[test]
fn cache_hit_without_staged_artifact_keeps_sources() {
  let env = TestEnv::new();
  env.write_source("pom.xml", "<project/>");
  let layers = Layers::new(env.layers());

  let mut expected = Table::new();
  expected.insert("java-version".to_string(), Value::String("17".to_string()));

  let mut cached = layers.layer("application").unwrap();
  cached.metadata = expected.clone();
  cached.write().unwrap();

  let executor = RecordingExecutor::default();
  let mut plan = BuildpackPlan::default();
  let err = application(&env, "target/*.jar", executor.clone(), expected, Logger::discard(), &mut plan)
    .contribute(layers.layer("application").unwrap())
    .unwrap_err();

  assert!(matches!(err, ApplicationError::Open { ref path, .. } if path.ends_with(APPLICATION_ZIP)));
  assert!(executor.calls().is_empty());
  assert!(env.application().join("pom.xml").exists());
  assert!(plan.entries.is_empty());
}

#[test]
fn artifact_that_is_not_a_zip_adds_no_plan_entry() {
  let env = TestEnv::new();
  env.write_source("pom.xml", "<project/>");

  let executor = RecordingExecutor::producing("target/app.jar", b"not a zip".to_vec());
  let mut plan = BuildpackPlan::default();
  let layers = Layers::new(env.layers());
  let err = application(&env, "target/*.jar", executor, Table::new(), Logger::discard(), &mut plan)
    .contribute(layers.layer("application").unwrap())
    .unwrap_err();

  assert!(matches!(err, ApplicationError::Extract { .. }));
  assert!(err.to_string().starts_with("unable to extract"));
  assert!(plan.entries.is_empty());
  assert!(env.layers().join("application").join(APPLICATION_ZIP).is_file());
}

#[test]
fn cache_that_is_a_file_keeps_sources() {
  let env = TestEnv::new();
  env.write_source("pom.xml", "<project/>");
  std::fs::remove_dir(env.cache()).unwrap();
  write(&env.cache(), b"not a directory");

  let executor = RecordingExecutor::producing("target/app.jar", stub_application_jar());
  let mut plan = BuildpackPlan::default();
  let err = application(&env, "target/*.jar", executor, Table::new(), Logger::discard(), &mut plan)
    .contribute(Layers::new(env.layers()).layer("application").unwrap())
    .unwrap_err();

  assert!(matches!(err, ApplicationError::PlanEntry(_)));
  assert!(env.application().join("pom.xml").exists());
  assert!(!env.application().join("fixture-marker").exists());
  assert!(plan.entries.is_empty());
}
