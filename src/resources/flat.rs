//! Pulumi TypeScript generators for flat projects.
//!
//! Every node exports its outputs as `export const {name}{Field}` so the
//! `${...}` placeholders written by the resolver bind through
//! `pulumi.interpolate`.

use super::render::{
    array, env_list, env_object, field, mismatch, object, quote, string_array, ts_value,
    ts_value_with_suffix, Dialect, Program,
};
use super::{GenerateError, GeneratedArtifact, GeneratorPlugin, RegistryError, ResourceDefinition};
use crate::core::naming::{code_identifier, output_variable};
use crate::core::resolved::*;

type Generated = Result<GeneratedArtifact, GenerateError>;

const IMPORTS: &[&str] = &[
    "import * as pulumi from \"@pulumi/pulumi\";",
    "import * as gcp from \"@pulumi/gcp\";",
];

fn program() -> Program {
    Program::new(Dialect::Pulumi, IMPORTS)
}

fn service_account(r: &ResolvedResource) -> Generated {
    let ResourceConfig::ServiceAccount(ref c) = r.config else {
        return Err(mismatch(r, "service_account"));
    };
    let ident = code_identifier(&r.name, "account");
    let mut p = program();
    p.declare(
        &ident,
        "gcp.serviceaccount.Account",
        &r.name,
        &[
            field("accountId", quote(&c.account_id)),
            field("displayName", quote(&c.display_name)),
        ],
    );
    for (i, role) in c.roles.iter().enumerate() {
        p.attach(
            "gcp.projects.IAMMember",
            &format!("{}-role-{}", r.name, i),
            &[
                field("project", "gcp.config.project!"),
                field("role", quote(role)),
                field("member", format!("pulumi.interpolate`serviceAccount:${{{}.email}}`", ident)),
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
        let cors = object(&[
            field("origins", string_array(&c.cors_origins)),
            field("methods", "[\"GET\", \"HEAD\", \"PUT\", \"POST\"]"),
            field("maxAgeSeconds", "3600"),
        ]);
        fields.push(field("cors", format!("[{}]", cors)));
    }

    let mut p = program();
    p.declare(&ident, "gcp.storage.Bucket", &r.name, &fields);
    if c.public {
        p.attach(
            "gcp.storage.BucketIAMMember",
            &format!("{}-public", r.name),
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
    p.declare(&ident, "gcp.secretmanager.Secret", &r.name, &fields);
    p.output(&r.name, "secretId", &format!("{}.secretId", ident));
    p.output(&r.name, "secretName", &format!("{}.name", ident));
    p.output(
        &r.name,
        "secretVersion",
        &format!("pulumi.interpolate`${{{}.name}}/versions/latest`", ident),
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
    p.declare(&ident, "gcp.pubsub.Topic", &r.name, &fields);
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
    p.declare(
        &ident,
        "gcp.cloudtasks.Queue",
        &r.name,
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
    let ident = code_identifier(&r.name, "network");
    let mut p = program();
    p.declare(
        &ident,
        "gcp.compute.Network",
        &r.name,
        &[
            field("name", quote(&c.network_name)),
            field("autoCreateSubnetworks", c.auto_create_subnetworks.to_string()),
        ],
    );
    p.output(&r.name, "name", &format!("{}.name", ident));
    Ok(p.finish())
}

fn subnetwork(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Subnet(ref c) = r.config else {
        return Err(mismatch(r, "subnet"));
    };
    let mut p = program();
    p.declare(
        &code_identifier(&r.name, "subnet"),
        "gcp.compute.Subnetwork",
        &r.name,
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
    p.declare(
        &code_identifier(&r.name, "firewall"),
        "gcp.compute.Firewall",
        &r.name,
        &[
            field("name", quote(&c.rule_name)),
            field("network", format!("{}.name", c.network)),
            field("allows", format!("[{}]", object(&allow))),
            field("sourceRanges", string_array(&c.source_ranges)),
        ],
    );
    Ok(p.finish())
}

fn artifact_registry(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Registry(ref c) = r.config else {
        return Err(mismatch(r, "registry"));
    };
    let ident = code_identifier(&r.name, "registry");
    let mut p = program();
    p.declare(
        &ident,
        "gcp.artifactregistry.Repository",
        &r.name,
        &[
            field("repositoryId", quote(&c.repository_id)),
            field("location", quote(&c.location)),
            field("format", quote(&c.format)),
        ],
    );
    p.output(&r.name, "url", &quote(&c.url));
    Ok(p.finish())
}

fn cloud_run_service(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Container(ref c) = r.config else {
        return Err(mismatch(r, "container"));
    };
    let ident = code_identifier(&r.name, "service");

    let mut container = vec![
        field("image", quote(&c.image)),
        field("ports", object(&[field("containerPort", c.port.to_string())])),
        field(
            "resources",
            object(&[field(
                "limits",
                object(&[field("cpu", quote(&c.cpu)), field("memory", quote(&c.memory))]),
            )]),
        ),
    ];
    if !c.env.is_empty() {
        container.push(field("envs", env_list(&c.env, Dialect::Pulumi)));
    }
    let mut template = vec![
        field("containers", format!("[{}]", object(&container))),
        field(
            "scaling",
            object(&[
                field("minInstanceCount", c.min_instances.to_string()),
                field("maxInstanceCount", c.max_instances.to_string()),
            ]),
        ),
    ];
    if let Some(ref connector) = c.connector {
        template.push(field("vpcAccess", object(&[field("connector", format!("{}.id", connector))])));
    }

    let mut p = program();
    p.declare(
        &ident,
        "gcp.cloudrunv2.Service",
        &r.name,
        &[
            field("name", quote(&c.service_name)),
            field("location", quote(&c.region)),
            field("ingress", quote("INGRESS_TRAFFIC_ALL")),
            field("template", object(&template)),
        ],
    );
    if c.allow_unauthenticated {
        p.attach(
            "gcp.cloudrunv2.ServiceIamMember",
            &format!("{}-invoker", r.name),
            &[
                field("name", format!("{}.name", ident)),
                field("location", quote(&c.region)),
                field("role", quote("roles/run.invoker")),
                field("member", quote("allUsers")),
            ],
        );
    }
    p.output(&r.name, "url", &format!("{}.uri", ident));
    p.output(&r.name, "serviceName", &format!("{}.name", ident));
    Ok(p.finish())
}

fn cloudfunctions_function(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Function(ref c) = r.config else {
        return Err(mismatch(r, "function"));
    };
    let ident = code_identifier(&r.name, "function");
    let source_bucket = code_identifier(&r.name, "source");
    let archive = code_identifier(&r.name, "archive");

    let mut p = program();
    p.declare(
        &source_bucket,
        "gcp.storage.Bucket",
        &format!("{}-source", r.name),
        &[
            field("location", quote(&c.region.to_uppercase())),
            field("uniformBucketLevelAccess", "true"),
        ],
    );
    p.declare(
        &archive,
        "gcp.storage.BucketObject",
        &format!("{}-archive", r.name),
        &[
            field("bucket", format!("{}.name", source_bucket)),
            field("source", format!("new pulumi.asset.FileArchive({})", quote(&c.source))),
        ],
    );

    let mut service = vec![
        field("availableMemory", quote(&c.memory)),
        field("timeoutSeconds", c.timeout_seconds.to_string()),
    ];
    if !c.env.is_empty() {
        service.push(field("environmentVariables", env_object(&c.env, Dialect::Pulumi)));
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
                field("pubsubTopic", ts_value(topic, Dialect::Pulumi)),
                field("retryPolicy", quote("RETRY_POLICY_RETRY")),
            ]),
        ));
    }
    p.declare(&ident, "gcp.cloudfunctionsv2.Function", &r.name, &fields);

    if c.allow_unauthenticated {
        p.attach(
            "gcp.cloudrunv2.ServiceIamMember",
            &format!("{}-invoker", r.name),
            &[
                field("name", format!("{}.name", ident)),
                field("location", quote(&c.region)),
                field("role", quote("roles/run.invoker")),
                field("member", quote("allUsers")),
            ],
        );
    }
    p.output(&r.name, "url", &format!("{}.url", ident));
    p.output(&r.name, "functionName", &format!("{}.name", ident));
    Ok(p.finish())
}

/// Default listener port for a Cloud SQL engine.
fn engine_port(engine: &str) -> u16 {
    if engine.starts_with("MYSQL") {
        3306
    } else if engine.starts_with("SQLSERVER") {
        1433
    } else {
        5432
    }
}

fn sql_database_instance(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Database(ref c) = r.config else {
        return Err(mismatch(r, "database"));
    };
    let ident = code_identifier(&r.name, "instance");
    let database = code_identifier(&r.name, "database");

    let mut ip = vec![field("ipv4Enabled", c.network.is_none().to_string())];
    if let Some(ref network) = c.network {
        ip.push(field("privateNetwork", format!("{}.id", network)));
    }
    let mut p = program();
    p.declare(
        &ident,
        "gcp.sql.DatabaseInstance",
        &r.name,
        &[
            field("name", quote(&c.instance_name)),
            field("region", quote(&c.region)),
            field("databaseVersion", quote(&c.engine)),
            field(
                "settings",
                object(&[
                    field("tier", quote(&c.tier)),
                    field("diskSize", c.disk_size_gb.to_string()),
                    field("ipConfiguration", object(&ip)),
                ]),
            ),
            field("deletionProtection", "false"),
        ],
    );
    p.declare(
        &database,
        "gcp.sql.Database",
        &format!("{}-db", r.name),
        &[
            field("name", quote(&r.name)),
            field("instance", format!("{}.name", ident)),
        ],
    );
    let host = if c.network.is_some() {
        "privateIpAddress"
    } else {
        "publicIpAddress"
    };
    p.output(&r.name, "connectionString", &format!("{}.connectionName", ident));
    p.output(&r.name, "host", &format!("{}.{}", ident, host));
    p.output(&r.name, "port", &quote(&engine_port(&c.engine).to_string()));
    p.output(&r.name, "instanceName", &format!("{}.name", ident));
    p.output(&r.name, "databaseName", &format!("{}.name", database));
    Ok(p.finish())
}

fn redis_instance(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Cache(ref c) = r.config else {
        return Err(mismatch(r, "cache"));
    };
    let ident = code_identifier(&r.name, "cache");
    let mut fields = vec![
        field("name", quote(&c.instance_name)),
        field("region", quote(&c.region)),
        field("tier", quote(&c.tier)),
        field("memorySizeGb", c.memory_size_gb.to_string()),
    ];
    if let Some(ref network) = c.network {
        fields.push(field("authorizedNetwork", format!("{}.id", network)));
    }
    let mut p = program();
    p.declare(&ident, "gcp.redis.Instance", &r.name, &fields);
    p.output(&r.name, "host", &format!("{}.host", ident));
    p.output(&r.name, "port", &format!("{}.port", ident));
    p.output(
        &r.name,
        "connectionString",
        &format!("pulumi.interpolate`redis://${{{0}.host}}:${{{0}.port}}`", ident),
    );
    Ok(p.finish())
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
        let target = match route.backend_kind {
            RouteBackendKind::Container => field(
                "cloudRun",
                object(&[field("service", output_variable(&route.backend, "serviceName"))]),
            ),
            RouteBackendKind::Function => field(
                "cloudFunction",
                object(&[field("function", output_variable(&route.backend, "functionName"))]),
            ),
            RouteBackendKind::Ui => {
                return Err(GenerateError::Render {
                    id: r.id.clone(),
                    message: format!("UI backend '{}' has no flat counterpart", route.backend),
                })
            }
        };
        let neg = code_identifier(&route.backend, "neg");
        p.declare(
            &neg,
            "gcp.compute.RegionNetworkEndpointGroup",
            &format!("{}-{}-neg", r.name, route.backend),
            &[
                field("region", quote(&c.region)),
                field("networkEndpointType", quote("SERVERLESS")),
                target,
            ],
        );
        let mut backend = vec![
            field("protocol", quote("HTTP")),
            field("loadBalancingScheme", quote("EXTERNAL_MANAGED")),
            field("backends", format!("[{{ group: {}.id }}]", neg)),
        ];
        if c.iap_members.is_some() {
            backend.push(field("iap", object(&[field("enabled", "true")])));
        }
        let backend_ident = code_identifier(&route.backend, "backend");
        p.declare(
            &backend_ident,
            "gcp.compute.BackendService",
            &format!("{}-{}-backend", r.name, route.backend),
            &backend,
        );
        for (i, member) in c.iap_members.iter().flatten().enumerate() {
            p.attach(
                "gcp.iap.WebBackendServiceIamMember",
                &format!("{}-{}-iap-{}", r.name, route.backend, i),
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
    p.declare(
        &url_map,
        "gcp.compute.URLMap",
        &format!("{}-url-map", r.name),
        &[
            field("name", quote(&format!("{}-url-map", c.lb_name))),
            field("defaultService", &default_service),
            field(
                "hostRules",
                format!("[{{ hosts: [{}], pathMatcher: \"routes\" }}]", quote(&host)),
            ),
            field(
                "pathMatchers",
                format!(
                    "[{}]",
                    object(&[
                        field("name", quote("routes")),
                        field("defaultService", &default_service),
                        field("pathRules", array(&rules)),
                    ])
                ),
            ),
        ],
    );

    let address = code_identifier(&r.name, "address");
    p.declare(
        &address,
        "gcp.compute.GlobalAddress",
        &format!("{}-address", r.name),
        &[field("name", quote(&format!("{}-ip", c.lb_name)))],
    );

    let proxy = code_identifier(&r.name, "proxy");
    let port = match (c.https, &c.domain) {
        (true, Some(domain)) => {
            let cert = code_identifier(&r.name, "cert");
            p.declare(
                &cert,
                "gcp.compute.ManagedSslCertificate",
                &format!("{}-cert", r.name),
                &[
                    field("name", quote(&format!("{}-cert", c.lb_name))),
                    field("managed", object(&[field("domains", string_array(&[domain.clone()]))])),
                ],
            );
            p.declare(
                &proxy,
                "gcp.compute.TargetHttpsProxy",
                &format!("{}-proxy", r.name),
                &[
                    field("urlMap", format!("{}.id", url_map)),
                    field("sslCertificates", format!("[{}.id]", cert)),
                ],
            );
            "443"
        }
        _ => {
            p.declare(
                &proxy,
                "gcp.compute.TargetHttpProxy",
                &format!("{}-proxy", r.name),
                &[field("urlMap", format!("{}.id", url_map))],
            );
            "80"
        }
    };
    p.attach(
        "gcp.compute.GlobalForwardingRule",
        &format!("{}-rule", r.name),
        &[
            field("target", format!("{}.id", proxy)),
            field("ipAddress", format!("{}.address", address)),
            field("portRange", quote(port)),
            field("loadBalancingScheme", quote("EXTERNAL_MANAGED")),
        ],
    );
    p.output(&r.name, "ipAddress", &format!("{}.address", address));
    Ok(p.finish())
}

fn cloud_scheduler_job(r: &ResolvedResource) -> Generated {
    let ResourceConfig::Cron(ref c) = r.config else {
        return Err(mismatch(r, "cron"));
    };
    let mut target = vec![
        field("uri", ts_value_with_suffix(&c.target_url, &c.path, Dialect::Pulumi)),
        field("httpMethod", quote(&c.method)),
    ];
    if let Some(ref body) = c.body {
        target.push(field(
            "body",
            format!("Buffer.from({}).toString(\"base64\")", quote(body)),
        ));
    }
    let mut p = program();
    p.declare(
        &code_identifier(&r.name, "job"),
        "gcp.cloudscheduler.Job",
        &r.name,
        &[
            field("name", quote(&c.job_name)),
            field("region", quote(&c.region)),
            field("schedule", quote(&c.schedule)),
            field("timeZone", quote(&c.time_zone)),
            field("httpTarget", object(&target)),
        ],
    );
    Ok(p.finish())
}

/// Every flat generator.
pub fn plugins() -> Result<Vec<GeneratorPlugin>, RegistryError> {
    Ok(vec![
        GeneratorPlugin::Flat(ResourceDefinition::of::<ServiceAccountConfig>(
            "gcp:service_account",
            service_account,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<BucketConfig>(
            "gcp:storage_bucket",
            storage_bucket,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<SecretConfig>("gcp:secret", secret)?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<TopicConfig>(
            "gcp:pubsub_topic",
            pubsub_topic,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<QueueConfig>(
            "gcp:cloud_tasks_queue",
            cloud_tasks_queue,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<NetworkConfig>("gcp:network", network)?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<SubnetConfig>(
            "gcp:subnetwork",
            subnetwork,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<FirewallConfig>("gcp:firewall", firewall)?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<RegistryConfig>(
            "gcp:artifact_registry",
            artifact_registry,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<ContainerConfig>(
            "gcp:cloud_run_service",
            cloud_run_service,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<FunctionConfig>(
            "gcp:cloudfunctions_function",
            cloudfunctions_function,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<DatabaseConfig>(
            "gcp:sql_database_instance",
            sql_database_instance,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<CacheConfig>(
            "gcp:redis_instance",
            redis_instance,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<LoadBalancerConfig>(
            "gcp:load_balancer",
            load_balancer,
        )?),
        GeneratorPlugin::Flat(ResourceDefinition::of::<CronConfig>(
            "gcp:cloud_scheduler_job",
            cloud_scheduler_job,
        )?),
    ])
}
