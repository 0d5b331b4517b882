// ecxctl - CLI for the Equinix ECX Fabric API
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use ecxctl::client::ApiClient;
use ecxctl::collection::Collection;
use ecxctl::config::{self, Config, Scope};
use ecxctl::error::ApiError;
use ecxctl::filter::{FilterCriteria, RecordFields};
use ecxctl::render::{self, OutputFormat};
use ecxctl::resources::connections::{ConnectionsApi, CreateL2Connection};
use ecxctl::resources::metros::MetrosApi;
use ecxctl::resources::ports::PortsApi;
use ecxctl::resources::routing::{CreateRoutingInstance, RoutingApi, RoutingQuery};
use ecxctl::resources::sellers::{MetroQuery, SellerProfilesApi, SellerServicesApi};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const CONNECTION_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "status",
    "metroCode",
    "portName",
    "vlanSTag",
    "speed",
    "speedUnit",
    "sellerServiceName",
];
const METRO_COLUMNS: &[&str] = &["code", "name", "region"];
const PORT_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "metroCode",
    "ibx",
    "status",
    "portSpeed",
    "encapsulation",
];
const PROFILE_COLUMNS: &[&str] = &["uuid", "name", "organizationName", "state", "integrationId"];
const L3_SERVICE_COLUMNS: &[&str] = &["uuid", "name", "organizationName", "state", "routeType", "asn"];
const ROUTING_COLUMNS: &[&str] = &["uuid", "name", "metroCode", "state", "routeType", "asn"];

#[derive(Parser)]
#[command(
    name = "ecxctl",
    version,
    about = "CLI for the Equinix ECX Fabric buyer API"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Config file to use instead of the user and local ones"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "ECX_API_HOST",
        value_name = "HOST",
        help = "ECX API endpoint (e.g. api.equinix.com)"
    )]
    ecx_api_host: Option<String>,

    #[arg(
        long,
        global = true,
        env = "EQUINIX_API_ID",
        value_name = "ID",
        help = "Equinix API application id"
    )]
    equinix_api_id: Option<String>,

    #[arg(
        long,
        global = true,
        env = "EQUINIX_API_SECRET",
        hide_env_values = true,
        value_name = "SECRET",
        help = "Equinix API application secret"
    )]
    equinix_api_secret: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "GRANT",
        help = "OAuth grant type (defaults to client_credentials)"
    )]
    client_grant_type: Option<String>,

    #[arg(long, global = true, env = "ECX_API_USER", help = "Portal username")]
    user: Option<String>,

    #[arg(
        long,
        global = true,
        env = "ECX_API_USER_PASSWORD",
        hide_env_values = true,
        help = "Portal password"
    )]
    password: Option<String>,

    #[arg(
        long,
        global = true,
        env = "ECX_PLAYGROUND_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN",
        help = "Developer playground token (skips the credential exchange)"
    )]
    playground_token: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "HOST",
        help = "Developer playground endpoint (defaults to playgroundapi.equinix.com)"
    )]
    playground_endpoint: Option<String>,

    #[arg(long, global = true, help = "Do not verify TLS certificates **INSECURE**")]
    ignore_ssl: bool,

    #[arg(long, global = true, help = "Enable debug logging on stderr")]
    debug: bool,

    #[arg(
        long,
        short = 'o',
        value_enum,
        default_value_t = OutputArg::Pretty,
        global = true,
        help = "Output format"
    )]
    output: OutputArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Persist the endpoint and credential flags given on this invocation
    Configure {
        #[arg(
            long,
            value_enum,
            default_value_t = ScopeArg::User,
            help = "Where to write the config (local project dir or user config dir)"
        )]
        scope: ScopeArg,
    },
    /// Show current configuration (secrets masked)
    ConfigShow,
    /// Buyer connections
    #[command(subcommand)]
    Connections(ConnectionsCommand),
    /// ECX metros
    #[command(subcommand)]
    Metros(MetrosCommand),
    /// Buyer ports
    #[command(subcommand)]
    Ports(PortsCommand),
    /// Seller service profiles (L2) and seller services (L3)
    #[command(subcommand)]
    Seller(SellerCommand),
    /// Layer 3 routing instances
    #[command(subcommand)]
    RoutingInstance(RoutingCommand),
    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
enum ConnectionsCommand {
    /// List all buyer connections
    List {
        #[arg(long, help = "Metro code (e.g. LD)")]
        metro: Option<String>,
        #[arg(long, short = 'f', value_name = "KEY=VALUE,...", help = "Attribute filter")]
        filter: Option<FilterCriteria>,
    },
    /// Get connections by uuid
    Get {
        #[arg(required = true)]
        uuids: Vec<String>,
    },
    /// Delete a connection by uuid
    Delete {
        #[arg(long, short = 'u')]
        uuid: String,
    },
    /// Create an L2 connection towards a seller service profile
    Create(CreateArgs),
}

#[derive(clap::Args)]
struct CreateArgs {
    #[arg(long, short = 'n', help = "Name of the primary connection")]
    name: String,
    #[arg(long, help = "Name of the secondary connection")]
    name_sec: Option<String>,
    #[arg(long, help = "Primary user port uuid")]
    port_uuid: String,
    #[arg(long, help = "Secondary user port uuid")]
    port_uuid_sec: Option<String>,
    #[arg(long, help = "Primary user vlan")]
    vlan: i64,
    #[arg(long, help = "Secondary user vlan")]
    vlan_sec: Option<i64>,
    #[arg(long, help = "Seller service profile uuid")]
    seller_uuid: String,
    #[arg(long, help = "Seller region (e.g. eu-west-1)")]
    seller_region: String,
    #[arg(long, help = "Seller metro code (e.g. LD)")]
    seller_metro: String,
    #[arg(long, help = "Connection speed")]
    speed: i64,
    #[arg(long, help = "Speed unit (MB, GB)")]
    speed_unit: String,
    #[arg(long, help = "Service authorization key (AWS: account id)")]
    auth_key: String,
    #[arg(long, value_delimiter = ',', required = true, help = "Notification emails")]
    notifications_email: Vec<String>,
    #[arg(long)]
    named_tag: Option<String>,
    #[arg(long)]
    purchase_order: Option<String>,
}

impl From<CreateArgs> for CreateL2Connection {
    fn from(args: CreateArgs) -> Self {
        Self {
            primary_name: args.name,
            primary_port_uuid: args.port_uuid,
            primary_vlan_s_tag: args.vlan,
            profile_uuid: args.seller_uuid,
            speed: args.speed,
            speed_unit: args.speed_unit,
            notifications: args.notifications_email,
            seller_region: Some(args.seller_region),
            seller_metro_code: Some(args.seller_metro),
            authorization_key: Some(args.auth_key),
            named_tag: args.named_tag,
            purchase_order_number: args.purchase_order,
            secondary_name: args.name_sec,
            secondary_port_uuid: args.port_uuid_sec,
            secondary_vlan_s_tag: args.vlan_sec,
        }
    }
}

#[derive(Subcommand)]
enum MetrosCommand {
    /// List all metros
    List {
        #[arg(long, short = 'f', value_name = "KEY=VALUE,...", help = "Attribute filter")]
        filter: Option<FilterCriteria>,
    },
}

#[derive(Subcommand)]
enum PortsCommand {
    /// List all buyer ports
    List {
        #[arg(long, short = 'f', value_name = "KEY=VALUE,...", help = "Attribute filter")]
        filter: Option<FilterCriteria>,
    },
}

#[derive(Subcommand)]
enum SellerCommand {
    /// Layer 2 seller service profiles
    #[command(subcommand)]
    L2(SellerL2Command),
    /// Layer 3 seller services
    #[command(subcommand)]
    L3(SellerL3Command),
}

#[derive(Subcommand)]
enum SellerL2Command {
    /// List seller service profiles
    List {
        #[arg(long, value_name = "LD,AM", help = "Comma separated metro codes")]
        metros: Option<String>,
        #[arg(long, short = 'f', value_name = "KEY=VALUE,...", help = "Attribute filter")]
        filter: Option<FilterCriteria>,
    },
    /// Get a seller service profile by uuid
    Get {
        #[arg(long)]
        uuid: String,
    },
}

#[derive(Subcommand)]
enum SellerL3Command {
    /// List layer 3 seller services
    List {
        #[arg(long, value_name = "LD,AM", help = "Comma separated metro codes")]
        metros: Option<String>,
        #[arg(long, short = 'f', value_name = "KEY=VALUE,...", help = "Attribute filter")]
        filter: Option<FilterCriteria>,
    },
}

#[derive(Subcommand)]
enum RoutingCommand {
    /// List routing instances
    List {
        #[arg(long, help = "Metro code")]
        metro: Option<String>,
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "PROVISIONED",
            help = "Routing instance states"
        )]
        state: Vec<String>,
        #[arg(long, short = 'f', value_name = "KEY=VALUE,...", help = "Attribute filter")]
        filter: Option<FilterCriteria>,
    },
    /// Check whether a routing instance name is taken in a metro
    CheckName {
        #[arg(long)]
        metro: String,
        #[arg(long)]
        instance_name: String,
    },
    /// Create a routing instance
    Create(RoutingCreateArgs),
}

#[derive(clap::Args)]
struct RoutingCreateArgs {
    #[arg(long, help = "Metro code")]
    metro: String,
    #[arg(long, short = 'n', help = "Name of the primary routing instance")]
    name: String,
    #[arg(long, help = "Name of the secondary routing instance")]
    name_sec: Option<String>,
    #[arg(long, default_value = "PRIVATE", help = "Route type")]
    route_type: String,
    #[arg(long, help = "BGP ASN")]
    asn: i64,
    #[arg(long, help = "BGP authorization key")]
    bgp_auth_key: Option<String>,
    #[arg(long, value_delimiter = ',', required = true, help = "Notification emails")]
    notifications_email: Vec<String>,
}

impl From<RoutingCreateArgs> for CreateRoutingInstance {
    fn from(args: RoutingCreateArgs) -> Self {
        Self {
            metro_code: args.metro,
            primary_name: args.name,
            secondary_name: args.name_sec,
            route_type: args.route_type,
            asn: args.asn,
            bgp_authorization_key: args.bgp_auth_key,
            notification_emails: args.notifications_email,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum OutputArg {
    Pretty,
    Json,
    Table,
}

impl From<OutputArg> for OutputFormat {
    fn from(value: OutputArg) -> Self {
        match value {
            OutputArg::Pretty => OutputFormat::Pretty,
            OutputArg::Json => OutputFormat::Json,
            OutputArg::Table => OutputFormat::Table,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    Local,
    User,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => Scope::Local,
            ScopeArg::User => Scope::User,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("warn,ecxctl=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Server-side validation errors get one line per entry.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api @ ApiError::BadRequest(_)) => {
            for entry in api.entries() {
                eprintln!("{entry}");
            }
        }
        _ => eprintln!("Error: {err:#}"),
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let output = OutputFormat::from(cli.output);
    let overrides = overrides(&cli);

    match cli.command {
        Commands::Configure { scope } => {
            let path = match &cli.config {
                Some(file) => file.clone(),
                None => config::config_path(scope.into(), &cwd)?,
            };
            return configure(&path, overrides);
        }
        Commands::ConfigShow => {
            let merged = load_files(cli.config.as_deref(), &cwd)?;
            println!("{}", serde_json::to_string_pretty(&config::masked(&merged))?);
            return Ok(());
        }
        Commands::Completion { shell } => {
            print_completion(shell);
            return Ok(());
        }
        _ => {}
    }

    let effective = config::resolve(load_files(cli.config.as_deref(), &cwd)?, overrides)?;
    let client = ApiClient::from_config(&effective)?;

    match cli.command {
        Commands::Connections(command) => connections(&client, command, output)?,
        Commands::Metros(MetrosCommand::List { filter }) => {
            let metros = MetrosApi::new(&client).list()?;
            print_list(metros, filter.as_ref(), output, METRO_COLUMNS, "No metros found")?;
        }
        Commands::Ports(PortsCommand::List { filter }) => {
            let ports = PortsApi::new(&client).list()?;
            print_list(ports, filter.as_ref(), output, PORT_COLUMNS, "No ports found")?;
        }
        Commands::Seller(command) => seller(&client, command, output)?,
        Commands::RoutingInstance(command) => routing(&client, command, output)?,
        Commands::Configure { .. } | Commands::ConfigShow | Commands::Completion { .. } => {
            unreachable!("handled earlier")
        }
    }

    Ok(())
}

fn overrides(cli: &Cli) -> Config {
    Config {
        endpoint: cli.ecx_api_host.clone(),
        client_id: cli.equinix_api_id.clone(),
        client_secret: cli.equinix_api_secret.clone(),
        grant_type: cli.client_grant_type.clone(),
        username: cli.user.clone(),
        password: cli.password.clone(),
        playground_token: cli.playground_token.clone(),
        playground_endpoint: cli.playground_endpoint.clone(),
        ignore_ssl: cli.ignore_ssl,
    }
}

fn load_files(file: Option<&Path>, cwd: &Path) -> Result<Config> {
    match file {
        Some(path) => config::load_file(path),
        None => config::load(cwd),
    }
}

fn configure(path: &Path, given: Config) -> Result<()> {
    if given == Config::default() {
        bail!("nothing to save; pass credential flags such as --equinix-api-id");
    }
    let existing = config::load_or_default(path)?;
    let updated = Config {
        endpoint: given.endpoint.or(existing.endpoint),
        client_id: given.client_id.or(existing.client_id),
        client_secret: given.client_secret.or(existing.client_secret),
        grant_type: given.grant_type.or(existing.grant_type),
        username: given.username.or(existing.username),
        password: given.password.or(existing.password),
        playground_token: given.playground_token.or(existing.playground_token),
        playground_endpoint: given.playground_endpoint.or(existing.playground_endpoint),
        ignore_ssl: given.ignore_ssl || existing.ignore_ssl,
    };
    config::save(path, &updated)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn connections(client: &ApiClient, command: ConnectionsCommand, output: OutputFormat) -> Result<()> {
    let api = ConnectionsApi::new(client);
    match command {
        ConnectionsCommand::List { metro, filter } => {
            let all = api.list(metro.as_deref())?;
            let empty = match metro.as_deref().filter(|m| !m.is_empty()) {
                Some(m) => format!("No connections found for {m} metro"),
                None => "No connections found".to_string(),
            };
            print_list(all, filter.as_ref(), output, CONNECTION_COLUMNS, &empty)?;
        }
        ConnectionsCommand::Get { uuids } => {
            for uuid in uuids {
                debug!(%uuid, "get connection");
                let conn = api.get(&uuid)?;
                println!("{}", render::render_one(&conn, output, CONNECTION_COLUMNS)?.trim_end());
            }
        }
        ConnectionsCommand::Delete { uuid } => {
            let deleted = api.delete(&uuid)?;
            let id = if deleted.primary_connection_id.is_empty() {
                uuid
            } else {
                deleted.primary_connection_id
            };
            println!("Connection {id} successfully deleted");
        }
        ConnectionsCommand::Create(args) => {
            let created = api.create_l2(&args.into())?;
            println!(
                "Connection {} successfully created",
                created.primary_connection_id
            );
            if let Some(secondary) = created.secondary_connection_id {
                println!("Secondary connection {secondary} successfully created");
            }
        }
    }
    Ok(())
}

fn seller(client: &ApiClient, command: SellerCommand, output: OutputFormat) -> Result<()> {
    match command {
        SellerCommand::L2(SellerL2Command::List { metros, filter }) => {
            let query = MetroQuery::from_csv(metros.as_deref());
            let profiles = SellerProfilesApi::new(client).list(&query)?;
            debug!(total = profiles.total_count, "seller service profiles (L2)");
            print_list(
                profiles,
                filter.as_ref(),
                output,
                PROFILE_COLUMNS,
                &no_metro_results("seller profiles", &query),
            )?;
        }
        SellerCommand::L2(SellerL2Command::Get { uuid }) => {
            let profile = SellerProfilesApi::new(client).profile(&uuid)?;
            println!("{}", render::render_one(&profile, output, PROFILE_COLUMNS)?.trim_end());
        }
        SellerCommand::L3(SellerL3Command::List { metros, filter }) => {
            let query = MetroQuery::from_csv(metros.as_deref());
            let services = SellerServicesApi::new(client).list(&query)?;
            debug!(total = services.total_count, "seller services (L3)");
            print_list(
                services,
                filter.as_ref(),
                output,
                L3_SERVICE_COLUMNS,
                &no_metro_results("seller services", &query),
            )?;
        }
    }
    Ok(())
}

fn routing(client: &ApiClient, command: RoutingCommand, output: OutputFormat) -> Result<()> {
    let api = RoutingApi::new(client);
    match command {
        RoutingCommand::List {
            metro,
            state,
            filter,
        } => {
            let query = RoutingQuery {
                metro_code: metro.filter(|m| !m.is_empty()),
                states: state,
            };
            let instances = api.list(&query)?;
            print_list(
                instances,
                filter.as_ref(),
                output,
                ROUTING_COLUMNS,
                "No routing instances found",
            )?;
        }
        RoutingCommand::CheckName {
            metro,
            instance_name,
        } => {
            if api.name_exists(&instance_name, &metro)? {
                println!("Routing instance name exists");
            } else {
                println!("Routing instance name doesn't exist");
            }
        }
        RoutingCommand::Create(args) => {
            let uuid = api.create(&args.into())?;
            println!("Routing instance {uuid} successfully created");
        }
    }
    Ok(())
}

fn no_metro_results(what: &str, query: &MetroQuery) -> String {
    if query.metro_codes.is_empty() {
        format!("No {what} found")
    } else {
        format!("No {what} found for {} metro", query.metro_codes.join(","))
    }
}

fn print_list<T>(
    collection: Collection<T>,
    filter: Option<&FilterCriteria>,
    output: OutputFormat,
    columns: &[&str],
    empty_message: &str,
) -> Result<()>
where
    T: RecordFields + Clone + Serialize,
{
    let fetched = collection.len();
    let collection = match filter {
        Some(criteria) => collection.filtered(criteria),
        None => collection,
    };
    debug!(fetched, kept = collection.len(), "listing");

    if collection.is_empty() {
        println!("{empty_message}");
        return Ok(());
    }
    let text = render::render(&collection.items, output, columns)?;
    println!("{}", text.trim_end());
    Ok(())
}

fn print_completion(shell: CompletionShell) {
    use clap_complete::{generate, shells};
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    let mut out = std::io::stdout();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, bin, &mut out),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, bin, &mut out),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, bin, &mut out),
        CompletionShell::PowerShell => generate(shells::PowerShell, &mut cmd, bin, &mut out),
    }
}
