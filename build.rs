fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "examples")]
    tonic_prost_build::compile_protos("demos/proto/greeter.proto")?;
    Ok(())
}
