//! End-to-end integration tests for the konggen CLI

use anyhow::{bail, Result};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

lazy_static! {
    static ref FIXTURES: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures/openapi");
}

fn fixture(name: &str) -> String {
    FIXTURES.join(name).to_string_lossy().to_string()
}

fn konggen(args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_konggen")).args(args).output()?;
    Ok(output)
}

/// Run `konggen generate` and fail with its output if it did not succeed
fn generate(schema: &str, output_dir: &Path, extra: &[&str]) -> Result<String> {
    let output_dir = output_dir.to_string_lossy().to_string();
    let mut args = vec![
        "generate",
        "--schema-path",
        schema,
        "--output-dir",
        output_dir.as_str(),
        "--yes",
    ];
    args.extend_from_slice(extra);

    let output = konggen(&args)?;
    if !output.status.success() {
        eprintln!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
        bail!("konggen generate failed with status {}", output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn read(path: impl AsRef<Path>) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// `bash -n` over a generated script; skipped where bash is not installed
fn assert_bash_syntax(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Ok(output) = Command::new("bash").arg("-n").arg(path).output() {
        if !output.status.success() {
            bail!(
                "{} is not valid bash: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
    Ok(())
}

#[test]
fn test_swagger_v2_petstore() -> Result<()> {
    let out = tempfile::tempdir()?;
    let stdout = generate(
        &fixture("petstore.swagger.v2.json"),
        out.path(),
        &["--kong-host", "kong.internal", "--target-api-name", "petstore"],
    )?;
    assert!(stdout.contains("Generated 7 route(s) in 3 file(s)"), "{}", stdout);

    let pet = read(out.path().join("PetApi.sh"))?;
    assert!(pet.contains("DEFAULT_ADMIN_URL=\"http://kong.internal:8001\""));
    assert!(pet.contains("DEFAULT_SERVICE_NAME=\"petstore\""));
    assert!(pet.contains("# PetApi: Kong routes for Swagger Petstore 1.0.5"));
    assert!(pet.contains("Its used to *_/ test /_* escaping."));
    assert!(pet.contains("$KONG_ADMIN_URL/services/$SERVICE_NAME/routes/getPetById"));
    assert!(pet.contains("'paths[]=~/pet/(?<petId>[^/]+)$'"));
    assert!(pet.contains("'paths[]=/pet/findByStatus'"));
    assert!(pet.contains("'config.replace.uri=/pet/$(uri_captures.{petId})'"));
    assert!(pet.contains("# deprecated"));
    assert!(pet.contains("# returns List[Pet]"));
    assert!(pet.contains("call_getPetById()"));
    assert!(pet.contains("\"$KONG_PROXY_URL/pet/${petId}\""));
    assert!(!pet.contains("getInventory"));

    let store = read(out.path().join("StoreApi.sh"))?;
    assert!(store.contains("# returns Map[String, Integer]"));
    assert!(store.contains("routes/getOrderById"));

    // `sample1` is reserved, so the operation id is escaped
    let user = read(out.path().join("UserApi.sh"))?;
    assert!(user.contains("routes/_sample1"));
    assert!(user.contains("call__sample1()"));

    for script in ["PetApi.sh", "StoreApi.sh", "UserApi.sh"] {
        assert_bash_syntax(out.path().join(script))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(out.path().join("PetApi.sh"))?.permissions().mode();
        assert_ne!(mode & 0o111, 0, "post-generate hook should make scripts executable");
    }
    Ok(())
}

#[test]
fn test_reserved_word_mapping_flag() -> Result<()> {
    let out = tempfile::tempdir()?;
    generate(
        &fixture("petstore.swagger.v2.json"),
        out.path(),
        &["--reserved-words-mappings", "sample1=updateUserSample"],
    )?;
    let user = read(out.path().join("UserApi.sh"))?;
    assert!(user.contains("routes/updateUserSample"));
    Ok(())
}

#[test]
fn test_openapi_v3_malformed_path_aborts() -> Result<()> {
    let out = tempfile::tempdir()?;
    let output_dir = out.path().to_string_lossy().to_string();
    let schema = fixture("store.openapi.v3.yaml");
    let output = konggen(&[
        "generate",
        "--schema-path",
        &schema,
        "--output-dir",
        &output_dir,
        "--yes",
    ])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/broken/{id"), "{}", stderr);
    assert!(stderr.contains("unclosed placeholder"), "{}", stderr);
    Ok(())
}

#[test]
fn test_openapi_v3_skip_invalid() -> Result<()> {
    let out = tempfile::tempdir()?;
    let stdout = generate(
        &fixture("store.openapi.v3.yaml"),
        out.path(),
        &["--skip-invalid"],
    )?;
    assert!(stdout.contains("Skipped GET /broken/{id"), "{}", stdout);
    assert!(!out.path().join("BrokenApi.sh").exists());

    let orders = read(out.path().join("OrdersApi.sh"))?;
    assert!(orders.contains("routes/listOrders"));
    assert!(orders.contains("routes/createOrder"));
    // no operationId: derived from path and method
    assert!(orders.contains("routes/ordersOrderIdItemsItemIdGet"));
    assert!(orders.contains(
        "'config.replace.uri=/orders/$(uri_captures.{orderId})/items/$(uri_captures.{itemId})'"
    ));
    assert!(orders.contains("local orderId=\"$1\""));
    assert!(orders.contains("local itemId=\"$2\""));
    assert!(orders.contains("# returns Map[String, String]"));

    // `file-name` is not a bash variable, so no helper is emitted
    let files = read(out.path().join("FilesApi.sh"))?;
    assert!(files.contains("'paths[]=~/files/(?<file_name>[^/]+)$'"));
    assert!(!files.contains("call_getFile"));
    assert!(files.contains("'config.replace.uri=/files/$(uri_captures.{file_name})'"));
    assert_bash_syntax(out.path().join("FilesApi.sh"))?;
    assert_bash_syntax(out.path().join("OrdersApi.sh"))?;
    Ok(())
}

#[test]
fn test_layout_and_operation_filters() -> Result<()> {
    let out = tempfile::tempdir()?;
    generate(
        &fixture("petstore.swagger.v2.json"),
        out.path(),
        &[
            "--source-folder",
            "scripts",
            "--api-package",
            "kong.routes",
            "--exclude-operations",
            "deletePet,getInventory",
        ],
    )?;
    let folder = out.path().join("scripts").join("kong").join("routes");
    let pet = read(folder.join("PetApi.sh"))?;
    assert!(pet.contains("routes/getPetById"));
    assert!(!pet.contains("routes/deletePet"));

    let store = read(folder.join("StoreApi.sh"))?;
    assert!(!store.contains("routes/getInventory"));
    Ok(())
}

#[test]
fn test_custom_template_dir() -> Result<()> {
    let templates = tempfile::tempdir()?;
    let template_dir = templates.path().join("custom");
    std::fs::create_dir_all(&template_dir)?;
    std::fs::write(
        template_dir.join("manifest.yaml"),
        "name: routes-list\nfiles:\n  - source: route.txt.tera\n    destination: \"{api}/{operation_id}.txt\"\n    for_each: operation\n",
    )?;
    std::fs::write(
        template_dir.join("route.txt.tera"),
        "{{ method }} {{ route_pattern }} -> {{ path }} @ {{ kong_host }}",
    )?;

    let out = tempfile::tempdir()?;
    let template_arg = templates.path().to_string_lossy().to_string();
    generate(
        &fixture("petstore.swagger.v2.json"),
        out.path(),
        &["--template-kind", "custom", "--template-dir", &template_arg],
    )?;
    assert_eq!(
        read(out.path().join("PetApi").join("getPetById.txt"))?,
        "GET ~/pet/(?<petId>[^/]+)$ -> /pet/$(uri_captures.{petId}) @ localhost"
    );
    Ok(())
}

#[test]
fn test_config_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("out");
    let config_path = dir.path().join("konggen.yaml");
    std::fs::write(
        &config_path,
        format!(
            "schema_path: {}\noutput_dir: {}\nskip_invalid: true\ngateway:\n  port: '8444'\n",
            fixture("store.openapi.v3.yaml"),
            out.display()
        ),
    )?;

    let config_arg = config_path.to_string_lossy().to_string();
    let output = konggen(&["generate", "--config", &config_arg, "--yes"])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let orders = read(out.join("OrdersApi.sh"))?;
    assert!(orders.contains("DEFAULT_ADMIN_URL=\"http://localhost:8444\""));
    Ok(())
}

#[test]
fn test_config_help() -> Result<()> {
    let output = konggen(&["config-help"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generator: kong"));
    assert!(stdout.contains("Kind: documentation"));
    assert!(stdout.contains("Generates a bash-script to create routes to a kong gateway."));
    for option in ["kongHost", "kongPort", "targetApiName"] {
        assert!(stdout.contains(option), "missing {}", option);
    }
    Ok(())
}

#[test]
fn test_missing_schema_path() -> Result<()> {
    let output = konggen(&["generate"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--schema-path"));
    Ok(())
}
