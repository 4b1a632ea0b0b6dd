fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/file_storage.proto");
    println!("cargo:rerun-if-env-changed=PROTOC");

    // Prefer a system protoc when one is configured, otherwise use the bundled binary.
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    tonic_build::compile_protos("proto/file_storage.proto")?;
    Ok(())
}
