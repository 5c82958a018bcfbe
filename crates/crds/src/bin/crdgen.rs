//! Emits the AppBundle CRD manifest as YAML on stdout.
//!
//! Usage: `cargo run --bin crdgen > config/crd/appbundles.yaml`

use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&crds::AppBundle::crd())?);
    Ok(())
}
