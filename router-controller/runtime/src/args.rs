use crate::{
    client::VampClient,
    k8s::{self, watcher},
    routing::{
        dispatch, IngressResolver, ReconcileMetrics, Reconciler, RoutingConfig, ServiceResolver,
    },
};
use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use prometheus_client::registry::Registry;
use std::convert::Infallible;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "vamp-router-controller",
    about = "Routes Kubernetes services and ingresses through a Vamp router"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "vamp_router=info,warn",
        env = "VAMP_ROUTER_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// The base URL of the router's management API, e.g.
    /// `http://vamp-router:10001`.
    #[clap(long, env = "ROUTER_API_ADDRESS")]
    router_api_address: String,

    /// The domain under which default hostnames are generated.
    #[clap(long, env = "ROOT_DNS_DOMAIN")]
    root_dns_domain: String,

    /// Joins an object's namespace and name in its route name.
    #[clap(long, env = "DOMAIN_SEPARATOR", default_value = ".")]
    domain_separator: String,

    #[clap(long, default_value = "cluster.local")]
    cluster_domain: String,

    /// Ingresses of this class are routed.
    #[clap(long, env = "INGRESS_TYPE", default_value = "vamp-router")]
    ingress_class: String,

    /// Services are watched only when set to `yes` (or `true`).
    #[clap(
        long,
        env = "WATCH_SERVICES",
        default_value = "no",
        action = ArgAction::Set,
        value_parser = parse_watch_services
    )]
    watch_services: bool,

    /// Ingresses are watched unless set to something other than `yes`,
    /// `true`, or the empty string.
    #[clap(
        long,
        env = "WATCH_INGRESSES",
        default_value = "yes",
        action = ArgAction::Set,
        value_parser = parse_watch_ingresses
    )]
    watch_ingresses: bool,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            router_api_address,
            root_dns_domain,
            domain_separator,
            cluster_domain,
            ingress_class,
            watch_services,
            watch_ingresses,
        } = self;

        if !watch_services && !watch_ingresses {
            bail!("at least one of --watch-services or --watch-ingresses must be enabled");
        }

        let config = RoutingConfig::new(&root_dns_domain)
            .with_domain_separator(domain_separator)
            .with_cluster_domain(&cluster_domain);
        let router = VampClient::new(&router_api_address)
            .with_context(|| format!("invalid router API address {router_api_address:?}"))?;

        let mut prom = <Registry>::default();
        let metrics = ReconcileMetrics::register(prom.sub_registry_with_prefix("vamp_router"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        info!(
            router = ?router,
            root_domain = %config.root_domain,
            watch_services,
            watch_ingresses,
            "Starting"
        );

        // Spawn resource watches.

        if watch_services {
            let services = runtime.watch_all::<k8s::Service>(watcher::Config::default());
            let reconciler = Reconciler::new(
                ServiceResolver::new(config.clone()),
                router.clone(),
                runtime.client(),
                metrics.clone(),
            );
            tokio::spawn(dispatch::run(reconciler, services).instrument(info_span!("services")));
        }

        if watch_ingresses {
            let ingresses = runtime.watch_all::<k8s::Ingress>(watcher::Config::default());
            let reconciler = Reconciler::new(
                IngressResolver::new(config, ingress_class),
                router,
                runtime.client(),
                metrics,
            );
            tokio::spawn(
                dispatch::run(reconciler, ingresses).instrument(info_span!("ingresses")),
            );
        }

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

fn parse_watch_services(s: &str) -> Result<bool, Infallible> {
    Ok(is_yes(s))
}

fn parse_watch_ingresses(s: &str) -> Result<bool, Infallible> {
    Ok(s.trim().is_empty() || is_yes(s))
}

fn is_yes(s: &str) -> bool {
    let s = s.trim();
    s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true")
}
