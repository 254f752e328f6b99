//! Launch and terminate over the AWS CLI.
//!
//! Launch is idempotent per project: an existing live instance is reused
//! (and started if stopped) instead of creating a second one.

use anyhow::{Context, Result, anyhow, bail};
use devbox_common::params::{
    validate_image_id, validate_instance_type, validate_key_pair, validate_param_prefix,
};
use devbox_common::tags::{NAME_TAG, instance_name};
use devbox_common::{
    InstanceRecord, LaunchOutcome, LaunchRequest, PROJECT_TAG, validate_project_name,
};
use serde_json::json;

use super::shapes::{DescribeImagesResponse, GetParameterResponse, RunInstancesResponse};
use super::{AwsCliBackend, AwsCliError};
use crate::ports::{CommandRunner, Provisioner, ResourceDirectory};
use crate::resolver::{Resolution, resolve};

/// SSM parameter holding the image a project was last launched from.
pub fn ami_parameter_name(param_prefix: &str, project: &str) -> String {
    format!("{}/{project}/ami", param_prefix.trim_end_matches('/'))
}

impl<R: CommandRunner> AwsCliBackend<R> {
    /// Reject any request value that could reach argv in a form the CLI expands.
    fn check_request(&self, request: &LaunchRequest) -> Result<()> {
        validate_project_name(&request.project)?;
        validate_instance_type(self.instance_type(request))?;
        validate_param_prefix(&request.param_prefix)?;
        if let Some(key) = &request.key_pair {
            validate_key_pair(key)?;
        }
        if let Some(ami) = &request.base_ami {
            validate_image_id(ami)?;
        }
        Ok(())
    }

    fn instance_type<'a>(&'a self, request: &'a LaunchRequest) -> &'a str {
        request
            .instance_type
            .as_deref()
            .unwrap_or(self.settings.default_instance_type.as_str())
    }

    fn emit(&self, request: &LaunchRequest, message: &str) {
        if request.emit_output {
            println!("{message}");
        }
    }

    /// Read an SSM string parameter; `Ok(None)` when it does not exist.
    async fn ssm_parameter(&self, name: &str) -> Result<Option<String>> {
        let result: Result<GetParameterResponse> =
            self.call(&["ssm", "get-parameter", "--name", name]).await;
        match result {
            Ok(resp) => Ok(Some(resp.parameter.value)),
            Err(e)
                if e.downcast_ref::<AwsCliError>()
                    .is_some_and(|cli| cli.has_code(&["ParameterNotFound"])) =>
            {
                Ok(None)
            }
            Err(e) => Err(e.context(format!("reading SSM parameter {name}"))),
        }
    }

    async fn wait_running(&self, instance_id: &str) -> Result<()> {
        self.call_raw(
            &["ec2", "wait", "instance-running", "--instance-ids", instance_id],
            Some(self.settings.launch_timeout),
        )
        .await
        .with_context(|| format!("waiting for {instance_id} to reach running"))?;
        Ok(())
    }

    /// Image to launch from: the project's recorded AMI, else `base_ami`.
    async fn pick_image(&self, request: &LaunchRequest) -> Result<String> {
        let parameter = ami_parameter_name(&request.param_prefix, &request.project);
        if let Some(ami) = self.ssm_parameter(&parameter).await? {
            validate_image_id(&ami).with_context(|| format!("value of {parameter}"))?;
            return Ok(ami);
        }
        request.base_ami.clone().ok_or_else(|| {
            anyhow!(
                "no AMI recorded at {parameter} for project '{}' and no base_ami given",
                request.project
            )
        })
    }

    /// Root volume mapping enlarging the image's root device to `min_gib`.
    async fn root_mapping(&self, image_id: &str, min_gib: u32) -> Result<String> {
        let resp: DescribeImagesResponse = self
            .call(&["ec2", "describe-images", "--image-ids", image_id])
            .await?;
        let image = resp
            .images
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("image {image_id} not found"))?;
        let root = image
            .root_device_name
            .clone()
            .ok_or_else(|| anyhow!("image {image_id} has no root device"))?;
        let size = image.root_volume_size().unwrap_or(0).max(min_gib);
        Ok(json!([{
            "DeviceName": root,
            "Ebs": {"VolumeSize": size, "DeleteOnTermination": true}
        }])
        .to_string())
    }

    async fn launch_new(&self, request: &LaunchRequest) -> Result<InstanceRecord> {
        let image_id = self.pick_image(request).await?;
        let instance_type = self.instance_type(request);
        let tag_spec = json!([{
            "ResourceType": "instance",
            "Tags": [
                {"Key": PROJECT_TAG, "Value": request.project},
                {"Key": NAME_TAG, "Value": instance_name(&request.project)},
            ]
        }])
        .to_string();
        let mapping = if request.volume_size > 0 {
            Some(self.root_mapping(&image_id, request.volume_size).await?)
        } else {
            None
        };

        let mut args = vec![
            "ec2",
            "run-instances",
            "--image-id",
            image_id.as_str(),
            "--instance-type",
            instance_type,
            "--count",
            "1",
            "--tag-specifications",
            tag_spec.as_str(),
        ];
        if let Some(key) = &request.key_pair {
            args.extend_from_slice(&["--key-name", key.as_str()]);
        }
        if let Some(mapping) = &mapping {
            args.extend_from_slice(&["--block-device-mappings", mapping.as_str()]);
        }

        self.emit(request, &format!("Launching {instance_type} from {image_id}"));
        let resp: RunInstancesResponse = self.call(&args).await?;
        let instance_id = resp
            .instances
            .into_iter()
            .next()
            .map(|i| i.instance_id)
            .ok_or_else(|| anyhow!("run-instances returned no instance"))?;
        tracing::info!(project = %request.project, %instance_id, "instance launched");

        self.wait_running(&instance_id).await?;
        self.refresh(&instance_id).await
    }

    async fn reuse(&self, instance: &InstanceRecord, request: &LaunchRequest) -> Result<InstanceRecord> {
        let id = instance.instance_id.as_str();
        match instance.state.as_str() {
            "running" => return Ok(instance.clone()),
            "stopped" => {
                self.emit(request, &format!("Starting stopped instance {id}"));
                self.call_raw(&["ec2", "start-instances", "--instance-ids", id], None)
                    .await?;
            }
            "pending" => {}
            other => bail!("instance {id} is {other}; retry once it has stopped"),
        }
        self.wait_running(id).await?;
        self.refresh(id).await
    }

    async fn refresh(&self, instance_id: &str) -> Result<InstanceRecord> {
        self.describe_instance_by_id(instance_id)
            .await?
            .ok_or_else(|| anyhow!("instance {instance_id} disappeared after launch"))
    }

    fn outcome(&self, request: &LaunchRequest, instance: InstanceRecord) -> LaunchOutcome {
        LaunchOutcome {
            project: request.project.clone(),
            instance_id: instance.instance_id,
            public_ip: instance.public_ip,
            username: self.settings.ssh_username.clone(),
            image_id: instance.image_id.unwrap_or_default(),
            instance_type: instance
                .instance_type
                .unwrap_or_else(|| self.settings.default_instance_type.clone()),
            key_pair: instance.key_name.or_else(|| request.key_pair.clone()),
            status: instance.state,
        }
    }
}

impl<R: CommandRunner> Provisioner for AwsCliBackend<R> {
    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchOutcome> {
        self.check_request(request)?;

        let existing = self.list_instances(Some(&request.project)).await?;
        let instance = match existing.as_slice() {
            [] => self.launch_new(request).await?,
            [instance] => {
                tracing::info!(
                    project = %request.project,
                    instance_id = %instance.instance_id,
                    state = %instance.state,
                    "reusing existing instance",
                );
                self.reuse(instance, request).await?
            }
            many => bail!(
                "{} instances already exist for project '{}'; terminate the extras first",
                many.len(),
                request.project
            ),
        };

        let outcome = self.outcome(request, instance);
        self.emit(
            request,
            &format!("Devbox {} is {}", outcome.instance_id, outcome.status),
        );
        Ok(outcome)
    }

    async fn terminate_instance(&self, identifier: &str) -> Result<(bool, String)> {
        let (instance_id, project) = match resolve(self, identifier).await? {
            Resolution::Found {
                instance_id,
                project,
            } => (instance_id, project),
            Resolution::Ambiguous { matches } => {
                return Ok((
                    false,
                    format!(
                        "Multiple instances ({matches}) found for project '{identifier}'; \
                         specify an instance id"
                    ),
                ));
            }
            Resolution::NotFound => {
                return Ok((false, format!("No devbox instance found for '{identifier}'")));
            }
        };

        self.call_raw(
            &["ec2", "terminate-instances", "--instance-ids", &instance_id],
            None,
        )
        .await?;

        let message = match project {
            Some(p) => format!("Terminating instance {instance_id} (project {p})"),
            None => format!("Terminating instance {instance_id}"),
        };
        Ok((true, message))
    }
}
