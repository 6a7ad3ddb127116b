//! Prints the WorkflowDefinition CRD generated from the Rust types.

use crds::WorkflowDefinition;
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&WorkflowDefinition::crd())?);
    Ok(())
}
