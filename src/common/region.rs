// Handles region things
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use aws_config::meta::region::future;
use aws_config::meta::region::ProvideRegion;
use aws_types::region;
use std::env;
use tracing::debug;

/// Region used when nothing is configured in the environment.
pub const DEFAULT_REGION: &str = "ap-southeast-2";

/// The AWS region that the clients are created in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Region {
    region: region::Region,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            region: region::Region::from_static(DEFAULT_REGION),
        }
    }
}

impl Region {
    /// Returns the region configured in the environment, falling back to
    /// `DEFAULT_REGION`.
    pub fn new() -> Self {
        let possibilities = vec![
            env::var("AWS_REGION"),
            env::var("AWS_DEFAULT_REGION"),
        ];

        let region = possibilities
            .iter()
            .find_map(|region| region.as_ref().ok())
            .filter(|region| !region.is_empty());

        debug!("AWS_REGION in environment is: {:?}", region);

        match region {
            Some(region) => Self::default().set_region(region),
            None         => Self::default(),
        }
    }

    /// Returns the region name
    pub fn name(&self) -> &str {
        self.region.as_ref()
    }

    /// Replaces the region.
    pub fn set_region(mut self, region: &str) -> Self {
        debug!("Region set to: {:?}", region);

        self.region = region::Region::new(region.to_string());
        self
    }
}

impl ProvideRegion for Region {
    // Allows our Region to be passed to SDK loaders expecting a region
    // provider.
    fn region(&self) -> future::ProvideRegion<'_> {
        future::ProvideRegion::ready(Some(self.region.to_owned()))
    }
}

impl From<&Region> for region::Region {
    fn from(region: &Region) -> Self {
        region.region.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_region_default() {
        assert_eq!(Region::default().name(), "ap-southeast-2");
    }

    #[test]
    fn test_region_set_region() {
        let region = Region::default().set_region("eu-west-1");
        let sdk_region: region::Region = (&region).into();

        assert_eq!(region.name(), "eu-west-1");
        assert_eq!(sdk_region, region::Region::new("eu-west-1"));
    }

    #[tokio::test]
    async fn test_region_provides_region() {
        let region = Region::default().set_region("us-east-1");

        let ret = ProvideRegion::region(&region).await;

        assert_eq!(ret, Some(region::Region::new("us-east-1")));
    }
}
