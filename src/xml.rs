//! # XML Document Access
//!
//! Thin wrapper over `xot` used by the manifest and supplemental-model
//! readers. It exposes the small slice of document navigation the readers
//! need (element children by local name, trimmed text content) and keeps
//! the name interning of `xot` behind one type.
//!
//! Also hosts the project-model reader, which turns a `<project>` element
//! into a [`ProjectModel`]: both supplements and the local-repository
//! project builder read the same document shape.

use xot::{Node, Xot};

use crate::model::{
    Build, BuildResource, CiManagement, Contributor, Dependency, DependencyManagement,
    DeploymentRepository, DistributionManagement, Extension, IssueManagement, License,
    MailingList, Organization, ParentRef, ProjectModel, ReportPlugin, ReportSet, Reporting,
    Repository, Scm, Site,
};

/// A parsed XML document rooted at its document element.
pub struct Doc {
    xot: Xot,
    root: Node,
}

impl Doc {
    /// Parse a document from text. Returns a plain message on failure so
    /// callers can attach their own location context.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut xot = Xot::new();
        let doc = xot.parse(text).map_err(|e| e.to_string())?;
        let root = xot.document_element(doc).map_err(|e| e.to_string())?;
        Ok(Self { xot, root })
    }

    pub fn root(&self) -> Node {
        self.root
    }

    /// Local name of an element node.
    pub fn name(&self, node: Node) -> Option<&str> {
        self.xot
            .element(node)
            .map(|el| self.xot.name_ns_str(el.name()).0)
    }

    /// Element children of a node, in document order.
    pub fn children(&self, node: Node) -> Vec<Node> {
        self.xot
            .children(node)
            .filter(|n| self.xot.element(*n).is_some())
            .collect()
    }

    /// First element child with the given local name.
    pub fn child(&self, node: Node, name: &str) -> Option<Node> {
        self.children(node)
            .into_iter()
            .find(|n| self.name(*n) == Some(name))
    }

    /// Trimmed text content of an element, `None` when empty.
    pub fn text(&self, node: Node) -> Option<String> {
        let mut out = String::new();
        for child in self.xot.children(node) {
            if let Some(t) = self.xot.text_str(child) {
                out.push_str(t);
            }
        }
        let trimmed = out.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Text content of the first child element with the given name.
    pub fn child_text(&self, node: Node, name: &str) -> Option<String> {
        self.child(node, name).and_then(|n| self.text(n))
    }

    fn child_bool(&self, node: Node, name: &str) -> Option<bool> {
        self.child_text(node, name)
            .map(|t| t.eq_ignore_ascii_case("true"))
    }

    /// Text content of every `item` child under the `list` child, e.g.
    /// `<filters><filter>a</filter><filter>b</filter></filters>`.
    pub fn string_list(&self, node: Node, list: &str, item: &str) -> Vec<String> {
        let Some(list_node) = self.child(node, list) else {
            return Vec::new();
        };
        self.children(list_node)
            .into_iter()
            .filter(|n| self.name(*n) == Some(item))
            .filter_map(|n| self.text(n))
            .collect()
    }
}

/// Read a project model from a `<project>` element.
pub fn read_project_model(doc: &Doc, project: Node) -> ProjectModel {
    let mut model = ProjectModel {
        group_id: doc.child_text(project, "groupId"),
        artifact_id: doc.child_text(project, "artifactId"),
        version: doc.child_text(project, "version"),
        packaging: doc.child_text(project, "packaging"),
        name: doc.child_text(project, "name"),
        description: doc.child_text(project, "description"),
        url: doc.child_text(project, "url"),
        inception_year: doc.child_text(project, "inceptionYear"),
        ..ProjectModel::default()
    };

    if let Some(parent) = doc.child(project, "parent") {
        model.parent = Some(ParentRef {
            group_id: doc.child_text(parent, "groupId"),
            artifact_id: doc.child_text(parent, "artifactId"),
            version: doc.child_text(parent, "version"),
        });
    }

    if let Some(org) = doc.child(project, "organization") {
        model.organization = Some(Organization {
            name: doc.child_text(org, "name"),
            url: doc.child_text(org, "url"),
        });
    }

    if let Some(licenses) = doc.child(project, "licenses") {
        for license in doc.children(licenses) {
            model.licenses.push(License {
                name: doc.child_text(license, "name"),
                url: doc.child_text(license, "url"),
                distribution: doc.child_text(license, "distribution"),
                comments: doc.child_text(license, "comments"),
            });
        }
    }

    if let Some(developers) = doc.child(project, "developers") {
        for dev in doc.children(developers) {
            model.developers.push(read_contributor(doc, dev));
        }
    }
    if let Some(contributors) = doc.child(project, "contributors") {
        for con in doc.children(contributors) {
            model.contributors.push(read_contributor(doc, con));
        }
    }

    if let Some(lists) = doc.child(project, "mailingLists") {
        for list in doc.children(lists) {
            model.mailing_lists.push(MailingList {
                name: doc.child_text(list, "name"),
                subscribe: doc.child_text(list, "subscribe"),
                unsubscribe: doc.child_text(list, "unsubscribe"),
                post: doc.child_text(list, "post"),
                archive: doc.child_text(list, "archive"),
            });
        }
    }

    if let Some(scm) = doc.child(project, "scm") {
        model.scm = Some(Scm {
            connection: doc.child_text(scm, "connection"),
            developer_connection: doc.child_text(scm, "developerConnection"),
            url: doc.child_text(scm, "url"),
            tag: doc.child_text(scm, "tag"),
        });
    }

    if let Some(issues) = doc.child(project, "issueManagement") {
        model.issue_management = Some(IssueManagement {
            system: doc.child_text(issues, "system"),
            url: doc.child_text(issues, "url"),
        });
    }

    if let Some(ci) = doc.child(project, "ciManagement") {
        model.ci_management = Some(CiManagement {
            system: doc.child_text(ci, "system"),
            url: doc.child_text(ci, "url"),
        });
    }

    if let Some(build) = doc.child(project, "build") {
        model.build = Some(read_build(doc, build));
    }

    if let Some(dist) = doc.child(project, "distributionManagement") {
        model.distribution_management = Some(read_distribution(doc, dist));
    }

    if let Some(repos) = doc.child(project, "repositories") {
        for repo in doc.children(repos) {
            model.repositories.push(Repository {
                id: doc.child_text(repo, "id"),
                name: doc.child_text(repo, "name"),
                url: doc.child_text(repo, "url"),
                layout: doc.child_text(repo, "layout"),
            });
        }
    }

    if let Some(deps) = doc.child(project, "dependencies") {
        for dep in doc.children(deps) {
            model.dependencies.push(read_dependency(doc, dep));
        }
    }

    if let Some(dep_mgmt) = doc.child(project, "dependencyManagement") {
        let mut management = DependencyManagement::default();
        if let Some(deps) = doc.child(dep_mgmt, "dependencies") {
            for dep in doc.children(deps) {
                management.dependencies.push(read_dependency(doc, dep));
            }
        }
        model.dependency_management = Some(management);
    }

    if let Some(reporting) = doc.child(project, "reporting") {
        model.reporting = Some(read_reporting(doc, reporting));
    }

    if let Some(properties) = doc.child(project, "properties") {
        for prop in doc.children(properties) {
            if let Some(name) = doc.name(prop) {
                model
                    .properties
                    .insert(name.to_string(), doc.text(prop).unwrap_or_default());
            }
        }
    }

    model
}

fn read_contributor(doc: &Doc, node: Node) -> Contributor {
    Contributor {
        id: doc.child_text(node, "id"),
        name: doc.child_text(node, "name"),
        email: doc.child_text(node, "email"),
        organization: doc.child_text(node, "organization"),
        url: doc.child_text(node, "url"),
        roles: doc.string_list(node, "roles", "role"),
    }
}

fn read_dependency(doc: &Doc, node: Node) -> Dependency {
    Dependency {
        group_id: doc.child_text(node, "groupId"),
        artifact_id: doc.child_text(node, "artifactId"),
        version: doc.child_text(node, "version"),
        artifact_type: doc.child_text(node, "type"),
        classifier: doc.child_text(node, "classifier"),
        scope: doc.child_text(node, "scope"),
        optional: doc.child_bool(node, "optional"),
    }
}

fn read_build(doc: &Doc, build: Node) -> Build {
    let mut out = Build {
        source_directory: doc.child_text(build, "sourceDirectory"),
        script_source_directory: doc.child_text(build, "scriptSourceDirectory"),
        test_source_directory: doc.child_text(build, "testSourceDirectory"),
        output_directory: doc.child_text(build, "outputDirectory"),
        test_output_directory: doc.child_text(build, "testOutputDirectory"),
        directory: doc.child_text(build, "directory"),
        default_goal: doc.child_text(build, "defaultGoal"),
        final_name: doc.child_text(build, "finalName"),
        filters: doc.string_list(build, "filters", "filter"),
        ..Build::default()
    };

    if let Some(resources) = doc.child(build, "resources") {
        for res in doc.children(resources) {
            out.resources.push(read_build_resource(doc, res));
        }
    }
    if let Some(resources) = doc.child(build, "testResources") {
        for res in doc.children(resources) {
            out.test_resources.push(read_build_resource(doc, res));
        }
    }
    if let Some(extensions) = doc.child(build, "extensions") {
        for ext in doc.children(extensions) {
            out.extensions.push(Extension {
                group_id: doc.child_text(ext, "groupId"),
                artifact_id: doc.child_text(ext, "artifactId"),
                version: doc.child_text(ext, "version"),
            });
        }
    }

    out
}

fn read_build_resource(doc: &Doc, node: Node) -> BuildResource {
    BuildResource {
        directory: doc.child_text(node, "directory"),
        target_path: doc.child_text(node, "targetPath"),
        filtering: doc.child_bool(node, "filtering"),
        includes: doc.string_list(node, "includes", "include"),
        excludes: doc.string_list(node, "excludes", "exclude"),
    }
}

fn read_distribution(doc: &Doc, dist: Node) -> DistributionManagement {
    let mut out = DistributionManagement {
        download_url: doc.child_text(dist, "downloadUrl"),
        ..DistributionManagement::default()
    };

    if let Some(site) = doc.child(dist, "site") {
        out.site = Some(Site {
            id: doc.child_text(site, "id"),
            name: doc.child_text(site, "name"),
            url: doc.child_text(site, "url"),
        });
    }
    if let Some(repo) = doc.child(dist, "repository") {
        out.repository = Some(read_deployment_repository(doc, repo));
    }
    if let Some(repo) = doc.child(dist, "snapshotRepository") {
        out.snapshot_repository = Some(read_deployment_repository(doc, repo));
    }

    out
}

fn read_deployment_repository(doc: &Doc, node: Node) -> DeploymentRepository {
    DeploymentRepository {
        id: doc.child_text(node, "id"),
        name: doc.child_text(node, "name"),
        url: doc.child_text(node, "url"),
        layout: doc.child_text(node, "layout"),
        unique_version: doc.child_bool(node, "uniqueVersion"),
    }
}

fn read_reporting(doc: &Doc, reporting: Node) -> Reporting {
    let mut out = Reporting {
        exclude_defaults: doc.child_bool(reporting, "excludeDefaults"),
        output_directory: doc.child_text(reporting, "outputDirectory"),
        ..Reporting::default()
    };

    if let Some(plugins) = doc.child(reporting, "plugins") {
        for plugin in doc.children(plugins) {
            let mut report_plugin = ReportPlugin {
                group_id: doc.child_text(plugin, "groupId"),
                artifact_id: doc.child_text(plugin, "artifactId"),
                version: doc.child_text(plugin, "version"),
                ..ReportPlugin::default()
            };
            if let Some(sets) = doc.child(plugin, "reportSets") {
                for set in doc.children(sets) {
                    report_plugin.report_sets.push(ReportSet {
                        id: doc.child_text(set, "id"),
                        reports: doc.string_list(set, "reports", "report"),
                    });
                }
            }
            out.plugins.push(report_plugin);
        }
    }

    out
}
