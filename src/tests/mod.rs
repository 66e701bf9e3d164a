//! End-to-end checks: calls files through the configured checker.

use crate::{
    language::typecheck::{DiagnosticKind, FormatDiagnostic},
    lint::{check_calls, load_checker, CheckSettings},
    project::{CallsFile, CheckerManifest, MANIFEST_FILE_NAME},
    target::BuildTarget,
};
use std::{fs, path::Path};

fn run(source: &str) -> Vec<Vec<FormatDiagnostic>> {
    let file = CallsFile::parse(Path::new("calls.toml"), source).unwrap();
    let checker = CheckerManifest::default().checker(BuildTarget::Triple("x86_64-unknown-linux-gnu".into()));
    check_calls(&checker, &file)
}

fn kinds(results: &[Vec<FormatDiagnostic>]) -> Vec<Vec<DiagnosticKind>> {
    results
        .iter()
        .map(|diagnostics| diagnostics.iter().map(|d| d.kind).collect())
        .collect()
}

#[test]
fn results_keep_input_order() {
    let source = r#"
[[call]]
function = "g_variant_new"
args = ['"(sv)"', "const gchar *", "GVariant *"]

[[call]]
function = "g_variant_new"
args = ['"(sv)"', "gint", "GVariant *"]

[[call]]
function = "g_free"
args = ["gpointer"]

[[call]]
function = "g_variant_new"
args = ['"s"']
"#;
    assert_eq!(
        kinds(&run(source)),
        vec![
            vec![],
            vec![DiagnosticKind::TypeMismatch],
            vec![],
            vec![DiagnosticKind::MissingArgument],
        ]
    );
}

#[test]
fn dictionary_iteration() {
    let source = r#"
[[call]]
function = "g_variant_iter_init"
args = ["GVariantIter *", "GVariant *"]

[[call]]
function = "g_variant_iter_loop"
args = ["GVariantIter *", '"{&sv}"', "const gchar **", "GVariant **"]

[[call]]
function = "g_variant_iter_next"
args = ["GVariantIter *", '"{&sv}"', "gchar **", "GVariant **"]

[[call]]
function = "g_variant_get_child"
args = ["GVariant *", "0", '"(^a&sm@s)"', "const gchar ***", "GVariant **"]
"#;
    let results = run(source);
    assert_eq!(
        kinds(&results),
        vec![vec![], vec![], vec![DiagnosticKind::TypeMismatch], vec![]]
    );
    assert_eq!(results[2][0].anchor, 2);
}

#[test]
fn builder_and_lookup_calls() {
    let source = r#"
[[call]]
function = "g_variant_builder_add"
args = ["GVariantBuilder *", '"{sv}"', '"name"', "GVariant *"]

[[call]]
function = "g_variant_builder_add"
args = ["GVariantBuilder *", '"{sv}"', '"name"', "GVariant *", "gint"]

[[call]]
function = "g_variant_lookup"
args = ["GVariant *", '"key"', '"u"', "guint *"]

[[call]]
function = "g_variant_lookup"
args = ["GVariant *", '"key"', '"u"', "gulong *"]
"#;
    let results = run(source);
    assert_eq!(
        kinds(&results),
        vec![
            vec![],
            vec![DiagnosticKind::ExcessArgument],
            vec![],
            vec![DiagnosticKind::ArchitectureDependentMismatch],
        ]
    );
    assert_eq!(results[1][0].suggestion, Some("i"));
}

#[test]
fn configuration_is_found_next_to_the_calls_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(MANIFEST_FILE_NAME),
        r#"
[types]
Handle = "gint32"

[[function]]
name = "my_log_variant"
format_param = 1
first_vararg = 2
"#,
    )
    .unwrap();
    let calls_path = dir.path().join("calls.toml");
    let source = r#"
[[call]]
function = "my_log_variant"
args = ["gint", '"(hs)"', "Handle", "gchar *"]
"#;
    fs::write(&calls_path, source).unwrap();

    let checker = load_checker(&calls_path, &CheckSettings::default()).unwrap();
    let file = CallsFile::parse(&calls_path, source).unwrap();
    assert_eq!(kinds(&check_calls(&checker, &file)), vec![Vec::<DiagnosticKind>::new()]);
}

#[test]
fn explicit_configuration_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let settings = CheckSettings {
        config: Some(dir.path().join("missing.toml")),
        target: None,
    };
    assert!(load_checker(&dir.path().join("calls.toml"), &settings).is_err());
}
