use oracle_providers::Client as ProviderClient;
use oracle_publisher::Publisher;

use crate::core::context::configuration::{Configuration, Profile};
use crate::core::context::environment::VariablesResolver;
use crate::core::Error;

pub mod configuration;
pub mod environment;

#[derive(Clone)]
pub struct Context {
    pub configuration: Configuration,
}

impl Context {
    pub fn new(configuration: Configuration) -> Context {
        Context { configuration }
    }

    /// Loads the configuration from, by increasing precedence, the profile file, the `ORACLE_*`
    /// environment variables and the command line arguments
    pub fn load() -> Result<Self, Error> {
        let resolver = VariablesResolver::initialize()?;
        let environment = resolver.resolve_environment()?;
        let arguments = resolver.resolve_arguments()?;

        let profile_path = arguments
            .get("profile")
            .or_else(|| environment.get("profile"))
            .and_then(|x| x.as_str())
            .filter(|x| !x.is_empty());

        if profile_path.is_none() {
            println!(
                "No profile file specified.
Please provide a configuration profile using the `--profile` argument or the `ORACLE_PROFILE` environment variable, \
unless all variables are set via command line or environment variables."
            );
        }

        let mut profile = profile_path.map(Profile::from_file).unwrap_or(Ok(Profile::empty()))?;
        profile.insert_variables(environment)?;
        profile.insert_variables(arguments)?;

        Configuration::from_profile(&profile).map(Self::new)
    }

    pub fn providers(&self) -> Result<Vec<ProviderClient>, Error> {
        self.configuration
            .providers
            .iter()
            .map(|x| ProviderClient::new(x).map_err(Error::from))
            .collect()
    }

    pub fn publisher(&self) -> Result<Publisher, Error> {
        Ok(Publisher::new(&self.configuration.publisher())?)
    }
}
