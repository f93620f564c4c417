//! Fixed vocabulary used by authorization and profile documents.
//!
//! These are protocol constants, not configuration.

/// Suffix appended to a blob's name to address its authorization document
pub const ACL_SUFFIX: &str = ".acl";
/// Name of the child blob holding a container's own authorization document
pub const ACL_CONTAINER_DOCUMENT: &str = ".acl";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Class of authorization statements
pub const ACL_AUTHORIZATION: &str = "http://www.w3.org/ns/auth/acl#Authorization";

/// Statement applies to exactly the referenced resource
pub const ACL_ACCESS_TO: &str = "http://www.w3.org/ns/auth/acl#accessTo";
/// Statement applies to descendants lacking their own document
pub const ACL_DEFAULT: &str = "http://www.w3.org/ns/auth/acl#default";

pub const ACL_AGENT: &str = "http://www.w3.org/ns/auth/acl#agent";
pub const ACL_AGENT_GROUP: &str = "http://www.w3.org/ns/auth/acl#agentGroup";
pub const ACL_AGENT_CLASS: &str = "http://www.w3.org/ns/auth/acl#agentClass";
pub const ACL_MODE: &str = "http://www.w3.org/ns/auth/acl#mode";

/// Class sentinel: any agent, authenticated or not
pub const FOAF_AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
/// Class sentinel: any agent presenting a verified identity
pub const ACL_AUTHENTICATED_AGENT: &str = "http://www.w3.org/ns/auth/acl#AuthenticatedAgent";

pub const ACL_READ: &str = "http://www.w3.org/ns/auth/acl#Read";
pub const ACL_WRITE: &str = "http://www.w3.org/ns/auth/acl#Write";
pub const ACL_APPEND: &str = "http://www.w3.org/ns/auth/acl#Append";
pub const ACL_CONTROL: &str = "http://www.w3.org/ns/auth/acl#Control";

/// Profile predicate linking an owner to an application node
pub const ACL_TRUSTED_APP: &str = "http://www.w3.org/ns/auth/acl#trustedApp";
/// Application node predicate naming the origin it runs on
pub const ACL_ORIGIN: &str = "http://www.w3.org/ns/auth/acl#origin";
