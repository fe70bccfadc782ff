//! Constants for the jiralink session backends.

/// User-Agent header value for both backends
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// REST resources live under this path relative to the site URL
pub const REST_API_PATH: &str = "rest/api/2/";

/// Endpoint of the legacy XML-RPC interface relative to the site URL
pub const XMLRPC_PATH: &str = "rpc/xmlrpc";

/// Every legacy method name is qualified with this handler prefix
pub const LEGACY_METHOD_PREFIX: &str = "jira1";

/// WSDL of the legacy service, used to tell whether it is enabled on a site
pub const LEGACY_WSDL_PATH: &str = "rpc/soap/jirasoapservice-v2?wsdl";

/// Result cap for general JQL searches on the legacy backend
pub const SEARCH_MAX_RESULTS: i32 = 50;

/// Result cap for targeted fix-version searches and bulk migrations
pub const UNBOUNDED_RESULTS: i32 = i32::MAX;

/// Issue type id used when creating issues ("Bug" on a stock install)
pub const DEFAULT_ISSUE_TYPE: &str = "1";

/// Field id of the fix-version list in update requests
pub const FIX_VERSIONS_FIELD: &str = "fixVersions";
