//! CDKTF TypeScript generators for construct projects.
//!
//! Code lands inside a `TerraformStack` constructor, so every declaration
//! takes `this` as scope and the node id as construct id. Workload
//! references are direct member expressions on the identifiers declared
//! here (`api_service.uri`); everything else binds through outputs.

use super::render::{
    array, env_list, env_object, field, mismatch, object, quote, string_array, ts_value,
    Dialect, Program,
};
use super::{GenerateError, GeneratedArtifact, GeneratorPlugin, RegistryError, ResourceDefinition};
use crate::core::naming::code_identifier;
use crate::core::resolved::*;

type Generated = Result<GeneratedArtifact, GenerateError>;

const PROVIDER_LIB: &str = "@cdktf/provider-google/lib";

fn program() -> Program {
    Program::new(Dialect::Cdktf, &[])
}

/// Import `class` from its provider module and return the class name.
fn uses<'c>(p: &mut Program, class: &'c str, module: &str) -> &'c str {
    p.import(&format!(
        "import {{ {} }} from \"{}/{}\";",
        class, PROVIDER_LIB, module
    ));
    class
}

fn service_account(r: &ResolvedResource) -> Generated {
    let ResourceConfig::ServiceAccount(ref c) = r.config else {
        return Err(mismatch(r, "service_account"));
    };
    let ident = code_identifier(&r.name, "account");
    let mut p = program();
    let class = uses(&mut p, "ServiceAccount", "service-account");
    p.declare(
        &ident,
        class,
        &r.id,
        &[
            field("accountId", quote(&c.account_id)),
            field("displayName", quote(&c.display_name)),
        ],
    );
    for (i, role) in c.roles.iter().enumerate() {
        let class = uses(&mut p, "ProjectIamMember", "project-iam-member");
        p.attach(
            class,
            &format!("{}-role-{}", r.id, i),
            &[
                field("project", format!("{}.project", ident)),
                field("role", quote(role)),
                field("member", format!("`serviceAccount:${{{}.email}}`", ident)),
            ],
        );
    }
    p.output(&r.name, "email", &format!("{}.email", ident));
    Ok(p.finish())
}

fn storage_bucket(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Bucket(ref c) = r.config else {
        return Err(mismatch(r, "bucket"));
    };
    let ident = code_identifier(&r.name, "bucket");
    let mut fields = vec![
        field("name", quote(&c.bucket_name)),
        field("location", quote(&c.location)),
        field("storageClass", quote(&c.storage_class)),
        field("uniformBucketLevelAccess", "true"),
    ];
    if c.versioning {
        fields.push(field("versioning", object(&[field("enabled", "true")])));
    }
    if !c.cors_origins.is_empty() {
        fields.push(field(
            "cors",
            array(&[object(&[
                field("origin", string_array(&c.cors_origins)),
                field("method", "[\"GET\", \"HEAD\", \"PUT\", \"POST\"]"),
                field("maxAgeSeconds", "3600"),
            ])]),
        ));
    }
    let mut p = program();
    let class = uses(&mut p, "StorageBucket", "storage-bucket");
    p.declare(&ident, class, &r.id, &fields);
    if c.public {
        let class = uses(&mut p, "StorageBucketIamMember", "storage-bucket-iam-member");
        p.attach(
            class,
            &format!("{}-public", r.id),
            &[
                field("bucket", format!("{}.name", ident)),
                field("role", quote("roles/storage.objectViewer")),
                field("member", quote("allUsers")),
            ],
        );
    }
    p.output(&r.name, "name", &format!("{}.name", ident));
    p.output(&r.name, "url", &format!("{}.url", ident));
    Ok(p.finish())
}

fn secret(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Secret(ref c) = r.config else {
        return Err(mismatch(r, "secret"));
    };
    let ident = code_identifier(&r.name, "secret");
    let mut fields = vec![
        field("secretId", quote(&c.secret_id)),
        field("replication", object(&[field("auto", "{}")])),
    ];
    if let Some(ref description) = c.description {
        fields.push(field(
            "annotations",
            object(&[field("description", quote(description))]),
        ));
    }
    let mut p = program();
    let class = uses(&mut p, "SecretManagerSecret", "secret-manager-secret");
    p.declare(&ident, class, &r.id, &fields);
    p.output(&r.name, "secretId", &format!("{}.secretId", ident));
    p.output(&r.name, "secretName", &format!("{}.name", ident));
    p.output(
        &r.name,
        "secretVersion",
        &format!("`${{{}.name}}/versions/latest`", ident),
    );
    Ok(p.finish())
}

fn pubsub_topic(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Topic(ref c) = r.config else {
        return Err(mismatch(r, "topic"));
    };
    let ident = code_identifier(&r.name, "topic");
    let mut fields = vec![field("name", quote(&c.topic_name))];
    if let Some(ref retention) = c.message_retention {
        fields.push(field("messageRetentionDuration", quote(retention)));
    }
    let mut p = program();
    let class = uses(&mut p, "PubsubTopic", "pubsub-topic");
    p.declare(&ident, class, &r.id, &fields);
    p.output(&r.name, "name", &format!("{}.name", ident));
    p.output(&r.name, "topicId", &format!("{}.id", ident));
    Ok(p.finish())
}

fn cloud_tasks_queue(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Queue(ref c) = r.config else {
        return Err(mismatch(r, "queue"));
    };
    let ident = code_identifier(&r.name, "queue");
    let mut p = program();
    let class = uses(&mut p, "CloudTasksQueue", "cloud-tasks-queue");
    p.declare(
        &ident,
        class,
        &r.id,
        &[
            field("name", quote(&c.queue_name)),
            field("location", quote(&c.location)),
            field(
                "rateLimits",
                object(&[field("maxDispatchesPerSecond", c.max_dispatches_per_second.to_string())]),
            ),
            field("retryConfig", object(&[field("maxAttempts", c.max_attempts.to_string())])),
        ],
    );
    p.output(&r.name, "name", &format!("{}.name", ident));
    p.output(&r.name, "queueId", &format!("{}.id", ident));
    Ok(p.finish())
}

fn network(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Network(ref c) = r.config else {
        return Err(mismatch(r, "network"));
    };
    let mut p = program();
    let class = uses(&mut p, "ComputeNetwork", "compute-network");
    p.declare(
        &code_identifier(&r.name, "network"),
        class,
        &r.id,
        &[
            field("name", quote(&c.network_name)),
            field("autoCreateSubnetworks", c.auto_create_subnetworks.to_string()),
        ],
    );
    Ok(p.finish())
}

fn subnetwork(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Subnet(ref c) = r.config else {
        return Err(mismatch(r, "subnet"));
    };
    let mut p = program();
    let class = uses(&mut p, "ComputeSubnetwork", "compute-subnetwork");
    p.declare(
        &code_identifier(&r.name, "subnet"),
        class,
        &r.id,
        &[
            field("name", quote(&c.subnet_name)),
            field("ipCidrRange", quote(&c.cidr)),
            field("region", quote(&c.region)),
            field("network", format!("{}.id", c.network)),
        ],
    );
    Ok(p.finish())
}

fn firewall(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Firewall(ref c) = r.config else {
        return Err(mismatch(r, "firewall"));
    };
    let mut allow = vec![field("protocol", quote(&c.protocol))];
    if !c.ports.is_empty() {
        allow.push(field("ports", string_array(&c.ports)));
    }
    let mut p = program();
    let class = uses(&mut p, "ComputeFirewall", "compute-firewall");
    p.declare(
        &code_identifier(&r.name, "firewall"),
        class,
        &r.id,
        &[
            field("name", quote(&c.rule_name)),
            field("network", format!("{}.name", c.network)),
            field("allow", array(&[object(&allow)])),
            field("sourceRanges", string_array(&c.source_ranges)),
        ],
    );
    Ok(p.finish())
}

fn artifact_registry(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Registry(ref c) = r.config else {
        return Err(mismatch(r, "registry"));
    };
    let mut p = program();
    let class = uses(&mut p, "ArtifactRegistryRepository", "artifact-registry-repository");
    p.declare(
        &code_identifier(&r.name, "registry"),
        class,
        &r.id,
        &[
            field("repositoryId", quote(&c.repository_id)),
            field("location", quote(&c.location)),
            field("format", quote(&c.format)),
        ],
    );
    p.output(&r.name, "url", &quote(&c.url));
    Ok(p.finish())
}

fn vpc_access_connector(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Connector(ref c) = r.config else {
        return Err(mismatch(r, "connector"));
    };
    let mut p = program();
    let class = uses(&mut p, "VpcAccessConnector", "vpc-access-connector");
    p.declare(
        &code_identifier(&r.name, "connector"),
        class,
        &r.id,
        &[
            field("name", quote(&c.connector_name)),
            field("region", quote(&c.region)),
            field("network", format!("{}.name", c.network)),
            field("ipCidrRange", quote(&c.ip_cidr_range)),
        ],
    );
    Ok(p.finish())
}

/// Fields shared by every Cloud Run service this backend declares.
struct RunService<'a> {
    name: &'a str,
    region: &'a str,
    image: &'a str,
    port: u16,
    env: &'a EnvMap,
    limits: Option<(&'a str, &'a str)>,
    scaling: (u32, u32),
    connector: Option<&'a str>,
}

fn declare_run_service(p: &mut Program, ident: &str, logical: &str, svc: RunService<'_>) {
    let mut container = vec![
        field("image", quote(svc.image)),
        field("ports", object(&[field("containerPort", svc.port.to_string())])),
    ];
    if let Some((cpu, memory)) = svc.limits {
        container.push(field(
            "resources",
            object(&[field(
                "limits",
                object(&[field("cpu", quote(cpu)), field("memory", quote(memory))]),
            )]),
        ));
    }
    if !svc.env.is_empty() {
        container.push(field("env", env_list(svc.env, Dialect::Cdktf)));
    }
    let mut template = vec![
        field("containers", array(&[object(&container)])),
        field(
            "scaling",
            object(&[
                field("minInstanceCount", svc.scaling.0.to_string()),
                field("maxInstanceCount", svc.scaling.1.to_string()),
            ]),
        ),
    ];
    if let Some(connector) = svc.connector {
        template.push(field(
            "vpcAccess",
            object(&[
                field("connector", format!("{}.id", connector)),
                field("egress", quote("PRIVATE_RANGES_ONLY")),
            ]),
        ));
    }
    let class = uses(p, "CloudRunV2Service", "cloud-run-v2-service");
    p.declare(
        ident,
        class,
        logical,
        &[
            field("name", quote(svc.name)),
            field("location", quote(svc.region)),
            field("ingress", quote("INGRESS_TRAFFIC_ALL")),
            field("template", object(&template)),
        ],
    );
}

fn allow_public(p: &mut Program, ident: &str, logical: &str, region: &str) {
    let class = uses(p, "CloudRunV2ServiceIamMember", "cloud-run-v2-service-iam-member");
    p.attach(
        class,
        &format!("{}-invoker", logical),
        &[
            field("name", format!("{}.name", ident)),
            field("location", quote(region)),
            field("role", quote("roles/run.invoker")),
            field("member", quote("allUsers")),
        ],
    );
}

fn cloud_run_service(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Container(ref c) = r.config else {
        return Err(mismatch(r, "container"));
    };
    let ident = code_identifier(&r.name, "service");
    let mut p = program();
    declare_run_service(
        &mut p,
        &ident,
        &r.id,
        RunService {
            name: &c.service_name,
            region: &c.region,
            image: &c.image,
            port: c.port,
            env: &c.env,
            limits: Some((c.cpu.as_str(), c.memory.as_str())),
            scaling: (c.min_instances, c.max_instances),
            connector: c.connector.as_deref(),
        },
    );
    if c.allow_unauthenticated {
        allow_public(&mut p, &ident, &r.id, &c.region);
    }
    p.output(&r.name, "url", &format!("{}.uri", ident));
    Ok(p.finish())
}

fn cloudfunctions_function(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Function(ref c) = r.config else {
        return Err(mismatch(r, "function"));
    };
    let ident = code_identifier(&r.name, "function");
    let asset = code_identifier(&r.name, "asset");
    let source_bucket = code_identifier(&r.name, "source");
    let archive = code_identifier(&r.name, "archive");

    let mut p = program();
    p.import("import { AssetType, TerraformAsset } from \"cdktf\";");
    p.line(format!(
        "const {} = new TerraformAsset(this, {}, {});",
        asset,
        quote(&format!("{}-asset", r.id)),
        object(&[
            field("path", quote(&c.source)),
            field("type", "AssetType.ARCHIVE"),
        ])
    ));
    let class = uses(&mut p, "StorageBucket", "storage-bucket");
    p.declare(
        &source_bucket,
        class,
        &format!("{}-source", r.id),
        &[
            field("name", quote(&format!("{}-source", c.function_name))),
            field("location", quote(&c.region.to_uppercase())),
            field("uniformBucketLevelAccess", "true"),
        ],
    );
    let class = uses(&mut p, "StorageBucketObject", "storage-bucket-object");
    p.declare(
        &archive,
        class,
        &format!("{}-archive", r.id),
        &[
            field("name", quote(&format!("{}.zip", r.name))),
            field("bucket", format!("{}.name", source_bucket)),
            field("source", format!("{}.path", asset)),
        ],
    );

    let mut service = vec![
        field("availableMemory", quote(&c.memory)),
        field("timeoutSeconds", c.timeout_seconds.to_string()),
    ];
    if !c.env.is_empty() {
        service.push(field("environmentVariables", env_object(&c.env, Dialect::Cdktf)));
    }
    if let Some(ref connector) = c.connector {
        service.push(field("vpcConnector", format!("{}.id", connector)));
    }
    let mut fields = vec![
        field("name", quote(&c.function_name)),
        field("location", quote(&c.region)),
        field(
            "buildConfig",
            object(&[
                field("runtime", quote(&c.runtime)),
                field("entryPoint", quote(&c.entry_point)),
                field(
                    "source",
                    object(&[field(
                        "storageSource",
                        object(&[
                            field("bucket", format!("{}.name", source_bucket)),
                            field("object", format!("{}.name", archive)),
                        ]),
                    )]),
                ),
            ]),
        ),
        field("serviceConfig", object(&service)),
    ];
    if let Some(ref topic) = c.trigger_topic {
        fields.push(field(
            "eventTrigger",
            object(&[
                field("eventType", quote("google.cloud.pubsub.topic.v1.messagePublished")),
                field("pubsubTopic", ts_value(topic, Dialect::Cdktf)),
                field("retryPolicy", quote("RETRY_POLICY_RETRY")),
            ]),
        ));
    }
    let class = uses(&mut p, "Cloudfunctions2Function", "cloudfunctions2-function");
    p.declare(&ident, class, &r.id, &fields);

    if c.allow_unauthenticated {
        let class = uses(
            &mut p,
            "Cloudfunctions2FunctionIamMember",
            "cloudfunctions2-function-iam-member",
        );
        p.attach(
            class,
            &format!("{}-invoker", r.id),
            &[
                field("cloudFunction", format!("{}.name", ident)),
                field("location", quote(&c.region)),
                field("role", quote("roles/cloudfunctions.invoker")),
                field("member", quote("allUsers")),
            ],
        );
    }
    p.output(&r.name, "url", &format!("{}.serviceConfig.uri", ident));
    Ok(p.finish())
}

/// Both kernel variants. Native kernels run on a VM with a container
/// declaration; hybrid kernels are an always-on Cloud Run service.
fn kernel(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Kernel(ref c) = r.config else {
        return Err(mismatch(r, "kernel"));
    };
    let ident = code_identifier(&r.name, "kernel");
    let mut p = program();

    match c.variant {
        KernelVariant::Hybrid => {
            declare_run_service(
                &mut p,
                &ident,
                &r.id,
                RunService {
                    name: &c.kernel_name,
                    region: &c.region,
                    image: &c.image,
                    port: c.port,
                    env: &c.env,
                    limits: None,
                    scaling: (1, 1),
                    connector: c.connector.as_deref(),
                },
            );
            p.output(&r.name, "url", &format!("{}.uri", ident));
        }
        KernelVariant::Native => {
            let network = r
                .network
                .as_deref()
                .map(|net| format!("{}.name", code_identifier(net, "network")))
                .unwrap_or_else(|| quote("default"));
            let declaration = format!(
                "JSON.stringify({})",
                object(&[field(
                    "spec",
                    object(&[
                        field(
                            "containers",
                            array(&[object(&[
                                field("image", quote(&c.image)),
                                field("env", env_list(&c.env, Dialect::Cdktf)),
                            ])]),
                        ),
                        field("restartPolicy", quote("Always")),
                    ]),
                )])
            );
            let class = uses(&mut p, "ComputeInstance", "compute-instance");
            p.declare(
                &ident,
                class,
                &r.id,
                &[
                    field("name", quote(&c.kernel_name)),
                    field("machineType", quote(&c.machine_type)),
                    field("zone", quote(&format!("{}-a", c.region))),
                    field(
                        "bootDisk",
                        object(&[field(
                            "initializeParams",
                            object(&[field("image", quote("cos-cloud/cos-stable"))]),
                        )]),
                    ),
                    field("networkInterface", array(&[object(&[field("network", network)])])),
                    field(
                        "metadata",
                        object(&[field("\"gce-container-declaration\"", declaration)]),
                    ),
                    field("tags", string_array(&["kernel".to_string()])),
                ],
            );
            p.output(
                &r.name,
                "address",
                &format!("`${{{}.networkInterface.get(0).networkIp}}:{}`", ident, c.port),
            );
        }
    }
    Ok(p.finish())
}

fn ui(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Ui(ref c) = r.config else {
        return Err(mismatch(r, "ui"));
    };
    let ident = code_identifier(&r.name, "ui");
    let mut p = program();
    declare_run_service(
        &mut p,
        &ident,
        &r.id,
        RunService {
            name: &c.service_name,
            region: &c.region,
            image: &c.image,
            port: c.port,
            env: &c.env,
            limits: None,
            scaling: (0, ContainerConfig::default().max_instances),
            connector: c.connector.as_deref(),
        },
    );
    allow_public(&mut p, &ident, &r.id, &c.region);
    p.output(&r.name, "url", &format!("{}.uri", ident));
    Ok(p.finish())
}

/// Serverless endpoint target of a routed backend.
fn route_backend(route: &RouteTarget) -> String {
    match route.backend_kind {
        RouteBackendKind::Container => field(
            "cloudRun",
            object(&[field(
                "service",
                format!("{}.name", code_identifier(&route.backend, "service")),
            )]),
        ),
        RouteBackendKind::Ui => field(
            "cloudRun",
            object(&[field(
                "service",
                format!("{}.name", code_identifier(&route.backend, "ui")),
            )]),
        ),
        RouteBackendKind::Function => field(
            "cloudFunction",
            object(&[field(
                "function",
                format!("{}.name", code_identifier(&route.backend, "function")),
            )]),
        ),
    }
}

fn load_balancer(r: &ResolvedResource) -> Generated {
    let ResourceConfig::LoadBalancer(ref c) = r.config else {
        return Err(mismatch(r, "load_balancer"));
    };
    let Some(first) = c.routes.first() else {
        return Err(GenerateError::Render {
            id: r.id.clone(),
            message: "load balancer has no routes".to_string(),
        });
    };

    let mut p = program();
    let mut seen: Vec<&str> = Vec::new();
    for route in &c.routes {
        if seen.contains(&route.backend.as_str()) {
            continue;
        }
        seen.push(&route.backend);

        let neg = code_identifier(&route.backend, "neg");
        let class = uses(
            &mut p,
            "ComputeRegionNetworkEndpointGroup",
            "compute-region-network-endpoint-group",
        );
        p.declare(
            &neg,
            class,
            &format!("{}-{}-neg", r.id, route.backend),
            &[
                field("name", quote(&format!("{}-{}-neg", c.lb_name, route.backend))),
                field("region", quote(&c.region)),
                field("networkEndpointType", quote("SERVERLESS")),
                route_backend(route),
            ],
        );

        let backend_ident = code_identifier(&route.backend, "backend");
        let mut backend = vec![
            field("name", quote(&format!("{}-{}-backend", c.lb_name, route.backend))),
            field("protocol", quote("HTTP")),
            field("loadBalancingScheme", quote("EXTERNAL_MANAGED")),
            field("backend", array(&[format!("{{ group: {}.id }}", neg)])),
        ];
        if c.iap_members.is_some() {
            backend.push(field("iap", object(&[field("enabled", "true")])));
        }
        let class = uses(&mut p, "ComputeBackendService", "compute-backend-service");
        p.declare(
            &backend_ident,
            class,
            &format!("{}-{}-backend", r.id, route.backend),
            &backend,
        );

        for (i, member) in c.iap_members.iter().flatten().enumerate() {
            let class = uses(
                &mut p,
                "IapWebBackendServiceIamMember",
                "iap-web-backend-service-iam-member",
            );
            p.attach(
                class,
                &format!("{}-{}-iap-{}", r.id, route.backend, i),
                &[
                    field("webBackendService", format!("{}.name", backend_ident)),
                    field("role", quote("roles/iap.httpsResourceAccessor")),
                    field("member", quote(member)),
                ],
            );
        }
    }

    let default_service = format!("{}.id", code_identifier(&first.backend, "backend"));
    let rules: Vec<String> = c
        .routes
        .iter()
        .map(|route| {
            format!(
                "{{ paths: [{}], service: {}.id }}",
                quote(&route.path),
                code_identifier(&route.backend, "backend")
            )
        })
        .collect();
    let host = c.domain.clone().unwrap_or_else(|| "*".to_string());
    let url_map = code_identifier(&r.name, "url_map");
    let class = uses(&mut p, "ComputeUrlMap", "compute-url-map");
    p.declare(
        &url_map,
        class,
        &format!("{}-url-map", r.id),
        &[
            field("name", quote(&format!("{}-url-map", c.lb_name))),
            field("defaultService", &default_service),
            field(
                "hostRule",
                array(&[format!("{{ hosts: [{}], pathMatcher: \"routes\" }}", quote(&host))]),
            ),
            field(
                "pathMatcher",
                array(&[object(&[
                    field("name", quote("routes")),
                    field("defaultService", &default_service),
                    field("pathRule", array(&rules)),
                ])]),
            ),
        ],
    );

    let address = code_identifier(&r.name, "address");
    let class = uses(&mut p, "ComputeGlobalAddress", "compute-global-address");
    p.declare(
        &address,
        class,
        &format!("{}-address", r.id),
        &[field("name", quote(&format!("{}-ip", c.lb_name)))],
    );

    let proxy = code_identifier(&r.name, "proxy");
    let port = match (c.https, &c.domain) {
        (true, Some(domain)) => {
            let cert = code_identifier(&r.name, "cert");
            let class = uses(&mut p, "ComputeManagedSslCertificate", "compute-managed-ssl-certificate");
            p.declare(
                &cert,
                class,
                &format!("{}-cert", r.id),
                &[
                    field("name", quote(&format!("{}-cert", c.lb_name))),
                    field("managed", object(&[field("domains", string_array(&[domain.clone()]))])),
                ],
            );
            let class = uses(&mut p, "ComputeTargetHttpsProxy", "compute-target-https-proxy");
            p.declare(
                &proxy,
                class,
                &format!("{}-proxy", r.id),
                &[
                    field("name", quote(&format!("{}-proxy", c.lb_name))),
                    field("urlMap", format!("{}.id", url_map)),
                    field("sslCertificates", format!("[{}.id]", cert)),
                ],
            );
            "443"
        }
        _ => {
            let class = uses(&mut p, "ComputeTargetHttpProxy", "compute-target-http-proxy");
            p.declare(
                &proxy,
                class,
                &format!("{}-proxy", r.id),
                &[
                    field("name", quote(&format!("{}-proxy", c.lb_name))),
                    field("urlMap", format!("{}.id", url_map)),
                ],
            );
            "80"
        }
    };
    let class = uses(&mut p, "ComputeGlobalForwardingRule", "compute-global-forwarding-rule");
    p.attach(
        class,
        &format!("{}-rule", r.id),
        &[
            field("name", quote(&format!("{}-rule", c.lb_name))),
            field("target", format!("{}.id", proxy)),
            field("ipAddress", format!("{}.address", address)),
            field("portRange", quote(port)),
            field("loadBalancingScheme", quote("EXTERNAL_MANAGED")),
        ],
    );
    p.output(&r.name, "ipAddress", &format!("{}.address", address));
    Ok(p.finish())
}

/// Every construct generator.
pub fn plugins() -> Result<Vec<GeneratorPlugin>, RegistryError> {
    Ok(vec![
        GeneratorPlugin::Construct(ResourceDefinition::of::<ServiceAccountConfig>(
            "gcp-cdktf:service_account",
            service_account,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<BucketConfig>(
            "gcp-cdktf:storage_bucket",
            storage_bucket,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<SecretConfig>(
            "gcp-cdktf:secret",
            secret,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<TopicConfig>(
            "gcp-cdktf:pubsub_topic",
            pubsub_topic,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<QueueConfig>(
            "gcp-cdktf:cloud_tasks_queue",
            cloud_tasks_queue,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<NetworkConfig>(
            "gcp-cdktf:network",
            network,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<SubnetConfig>(
            "gcp-cdktf:subnetwork",
            subnetwork,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<FirewallConfig>(
            "gcp-cdktf:firewall",
            firewall,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<RegistryConfig>(
            "gcp-cdktf:artifact_registry",
            artifact_registry,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<ConnectorConfig>(
            "gcp-cdktf:vpc_access_connector",
            vpc_access_connector,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<ContainerConfig>(
            "gcp-cdktf:cloud_run_service",
            cloud_run_service,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<FunctionConfig>(
            "gcp-cdktf:cloudfunctions_function",
            cloudfunctions_function,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<KernelConfig>(
            "gcp-cdktf:kernel",
            kernel,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<KernelConfig>(
            "gcp-cdktf:hybrid_kernel",
            kernel,
        )?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<UiConfig>("gcp-cdktf:ui", ui)?),
        GeneratorPlugin::Construct(ResourceDefinition::of::<LoadBalancerConfig>(
            "gcp-cdktf:load_balancer",
            load_balancer,
        )?),
    ])
}
