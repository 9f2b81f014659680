//! Compilation of assembled specs into compose service descriptors.
//!
//! Volume and install ordering follow each app's lib discovery order, so
//! the emitted document is identical for identical inputs.

use std::collections::BTreeMap;

use devyard_common::error::Result;
use devyard_common::layout::Layout;
use devyard_common::types::{PortMap, Repo};
use devyard_spec::{ImageSource, Service};
use serde::Serialize;

use crate::assembler::{AssembledLib, AssembledSpecs};
use crate::links;
use crate::once_guard::OnceGuard;

/// Runtime-ready description of one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeServiceDescriptor {
    /// `image` or `build` key.
    #[serde(flatten)]
    pub source: ImageSource,
    /// Startup command, a single shell invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Linked container names.
    pub links: Vec<String>,
    /// `host:container` volume strings.
    pub volumes: Vec<String>,
    /// `host:container` port strings.
    pub ports: Vec<String>,
}

/// Service name to descriptor, the document handed to the runtime adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComposeDocument(BTreeMap<String, ComposeServiceDescriptor>);

impl ComposeDocument {
    /// Descriptor of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComposeServiceDescriptor> {
        self.0.get(name)
    }

    /// Descriptors sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComposeServiceDescriptor)> {
        self.0.iter().map(|(n, d)| (n.as_str(), d))
    }

    /// Number of containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no container is described.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn mount_volume(repo: &Repo, mount: &str, layout: &Layout) -> String {
    format!("{}:{}", repo.managed_path(layout.repos_dir()).display(), mount)
}

/// Volumes of an app container.
///
/// The staging mount comes first, then the app's source mount, then one
/// mount per lib in discovery order.
///
/// # Errors
///
/// Returns an error if the app or one of its libs is not active.
pub fn volumes_for(app_name: &str, assembled: &AssembledSpecs, layout: &Layout) -> Result<Vec<String>> {
    let mut volumes = vec![layout.staging_volume(app_name)];
    volumes.extend(app_volume_mounts(app_name, assembled, layout)?);
    Ok(volumes)
}

/// Source mounts of an app: its own repo, then its libs'.
///
/// # Errors
///
/// Returns an error if the app or one of its libs is not active.
pub fn app_volume_mounts(
    app_name: &str,
    assembled: &AssembledSpecs,
    layout: &Layout,
) -> Result<Vec<String>> {
    let app = assembled.app(app_name)?;
    let mut volumes = Vec::with_capacity(app.libs.len() + 1);
    if let Some(source) = &app.source {
        volumes.push(mount_volume(&source.repo, &source.mount, layout));
    }
    for lib_name in &app.libs {
        let lib = assembled.lib(lib_name)?;
        volumes.push(mount_volume(&lib.repo, &lib.mount, layout));
    }
    Ok(volumes)
}

/// Source mounts of a lib: its own repo, then its dependencies'.
///
/// # Errors
///
/// Returns an error if the lib or one of its dependencies is not active.
pub fn lib_volume_mounts(
    lib_name: &str,
    assembled: &AssembledSpecs,
    layout: &Layout,
) -> Result<Vec<String>> {
    let lib = assembled.lib(lib_name)?;
    let mut volumes = vec![mount_volume(&lib.repo, &lib.mount, layout)];
    for dep_name in lib.libs.iter().filter(|n| n.as_str() != lib_name) {
        let dep = assembled.lib(dep_name)?;
        volumes.push(mount_volume(&dep.repo, &dep.mount, layout));
    }
    Ok(volumes)
}

/// `cd <mount> && <install>`, or an empty string when the lib has no
/// install instruction.
#[must_use]
pub fn install_command_for(lib: &AssembledLib) -> String {
    lib.install
        .as_ref()
        .map_or_else(String::new, |install| format!("cd {} && {install}", lib.mount))
}

/// The startup command of an app container.
///
/// Steps, in order: lib installs, `cd` into the app mount, `PATH` export,
/// the once-guarded block, then the `always` commands. Steps are joined
/// with `; ` and wrapped in a single `sh -c` invocation.
///
/// # Errors
///
/// Returns an error if the app or one of its libs is not active.
pub fn composed_command_for(
    app_name: &str,
    assembled: &AssembledSpecs,
    layout: &Layout,
) -> Result<String> {
    let app = assembled.app(app_name)?;
    let mut steps = Vec::new();

    for lib_name in &app.libs {
        let install = install_command_for(assembled.lib(lib_name)?);
        if !install.is_empty() {
            steps.push(install);
        }
    }
    if let Some(source) = &app.source {
        steps.push(format!("cd {}", source.mount));
        steps.push(format!("export PATH=$PATH:{}", source.mount));
    }
    steps.extend(OnceGuard::new(layout).steps(&app.commands));

    Ok(format!("sh -c \"{}\"", escape_double_quoted(&steps.join("; "))))
}

/// Escapes the characters that end or alter a double-quoted argument.
fn escape_double_quoted(body: &str) -> String {
    let mut escaped = String::with_capacity(body.len());
    for c in body.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `host:container` strings for `name`, in allocation order.
#[must_use]
pub fn ports_for(name: &str, port_map: &PortMap) -> Vec<String> {
    port_map.get(name).iter().map(ToString::to_string).collect()
}

/// Full descriptor of an active app.
///
/// # Errors
///
/// Returns an error if the app or one of its libs is not active.
pub fn service_descriptor_for(
    app_name: &str,
    assembled: &AssembledSpecs,
    port_map: &PortMap,
    layout: &Layout,
) -> Result<ComposeServiceDescriptor> {
    let app = assembled.app(app_name)?;
    tracing::debug!(app = %app_name, "compiling app descriptor");
    Ok(ComposeServiceDescriptor {
        source: app.image.clone(),
        command: Some(composed_command_for(app_name, assembled, layout)?),
        links: links::links_for(app_name, assembled)?,
        volumes: volumes_for(app_name, assembled, layout)?,
        ports: ports_for(app_name, port_map),
    })
}

fn service_descriptor(name: &str, service: &Service, port_map: &PortMap) -> ComposeServiceDescriptor {
    ComposeServiceDescriptor {
        source: ImageSource::Image(service.image.clone()),
        command: service.command.clone(),
        links: Vec::new(),
        volumes: service.volumes.clone(),
        ports: ports_for(name, port_map),
    }
}

/// Descriptors for every active app and service.
///
/// # Errors
///
/// Returns the first error hit while compiling an app; nothing partial is
/// returned.
pub fn compose_document(
    assembled: &AssembledSpecs,
    port_map: &PortMap,
    layout: &Layout,
) -> Result<ComposeDocument> {
    tracing::info!(
        apps = assembled.apps.len(),
        services = assembled.services.len(),
        "compiling compose document"
    );
    let mut document = BTreeMap::new();
    for name in assembled.apps.keys() {
        let _ = document.insert(
            name.clone(),
            service_descriptor_for(name, assembled, port_map, layout)?,
        );
    }
    for (name, service) in &assembled.services {
        let _ = document.insert(name.clone(), service_descriptor(name, service, port_map));
    }
    Ok(ComposeDocument(document))
}

#[cfg(test)]
mod tests {
    use devyard_common::types::PortMapping;
    use devyard_spec::{App, Bundle, Commands, Depends, Lib, LibDepends, SpecSet};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::assembler::assemble;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn basic_specs() -> SpecSet {
        let mut specs = SpecSet::new();
        let _ = specs.apps.insert(
            "app1".into(),
            App {
                repo: Some(Repo::new("/app1")),
                mount: Some("/gc/app1".into()),
                depends: Depends {
                    apps: names(&["app2"]),
                    libs: names(&["lib1", "lib2"]),
                    services: names(&["service1", "service2"]),
                },
                commands: Some(Commands {
                    once: names(&["one_time.sh"]),
                    always: names(&["always.sh"]),
                }),
                image: Some("awesomeGCimage".into()),
                ..App::default()
            },
        );
        let _ = specs.apps.insert(
            "app2".into(),
            App {
                repo: Some(Repo::new("/app2")),
                mount: Some("/gc/app2".into()),
                image: Some("app2image".into()),
                ..App::default()
            },
        );
        let _ = specs.libs.insert(
            "lib1".into(),
            Lib {
                repo: Repo::new("/lib1"),
                mount: "/gc/lib1".into(),
                depends: LibDepends {
                    libs: names(&["lib2"]),
                },
                install: Some("./install.sh".into()),
            },
        );
        let _ = specs.libs.insert(
            "lib2".into(),
            Lib {
                repo: Repo::new("/lib2"),
                mount: "/gc/lib2".into(),
                depends: LibDepends::default(),
                install: Some("python setup.py develop".into()),
            },
        );
        for service in ["service1", "service2"] {
            let _ = specs.services.insert(
                service.into(),
                Service {
                    image: format!("{service}:1"),
                    ..Service::default()
                },
            );
        }
        let _ = specs.bundles.insert(
            "everything".into(),
            Bundle {
                apps: names(&["app1"]),
                ..Bundle::default()
            },
        );
        specs
    }

    fn layout() -> Layout {
        Layout::with_repos_dir("/Users/gc")
    }

    fn basic_ports() -> PortMap {
        let mut ports = PortMap::new();
        ports.insert(
            "app1",
            vec![
                PortMapping {
                    mapped_host_port: 8000,
                    in_container_port: 1,
                },
                PortMapping {
                    mapped_host_port: 8005,
                    in_container_port: 90,
                },
            ],
        );
        ports.insert("app2", Vec::new());
        ports
    }

    fn assembled(specs: &SpecSet) -> AssembledSpecs {
        assemble(specs, &["everything"]).expect("assemble")
    }

    #[test]
    fn composed_volumes() {
        let volumes = volumes_for("app1", &assembled(&basic_specs()), &layout()).expect("volumes");
        assert_eq!(
            volumes,
            vec![
                "/cp/app1:/cp",
                "/Users/gc/app1:/gc/app1",
                "/Users/gc/lib1:/gc/lib1",
                "/Users/gc/lib2:/gc/lib2",
            ]
        );
    }

    #[test]
    fn app_volume_mounts_without_libs() {
        let mounts =
            app_volume_mounts("app2", &assembled(&basic_specs()), &layout()).expect("mounts");
        assert_eq!(mounts, vec!["/Users/gc/app2:/gc/app2"]);
    }

    #[test]
    fn lib_volume_mounts_include_dependencies() {
        let specs = assembled(&basic_specs());
        assert_eq!(
            lib_volume_mounts("lib1", &specs, &layout()).expect("lib1"),
            vec!["/Users/gc/lib1:/gc/lib1", "/Users/gc/lib2:/gc/lib2"]
        );
        assert_eq!(
            lib_volume_mounts("lib2", &specs, &layout()).expect("lib2"),
            vec!["/Users/gc/lib2:/gc/lib2"]
        );
    }

    #[test]
    fn compile_command_with_once() {
        let command =
            composed_command_for("app1", &assembled(&basic_specs()), &layout()).expect("command");
        let parts: Vec<&str> = command.split(';').collect();
        assert_eq!(
            parts,
            vec![
                "sh -c \"cd /gc/lib1 && ./install.sh",
                " cd /gc/lib2 && python setup.py develop",
                " cd /gc/app1",
                " export PATH=$PATH:/gc/app1",
                " if [ ! -f /var/run/devyard/docker_first_time_started ]",
                " then mkdir -p /var/run/devyard",
                " touch /var/run/devyard/docker_first_time_started",
                " one_time.sh",
                " fi",
                " always.sh\"",
            ]
        );
    }

    #[test]
    fn compile_command_without_once() {
        let mut specs = basic_specs();
        specs
            .apps
            .get_mut("app1")
            .expect("app1")
            .commands
            .as_mut()
            .expect("commands")
            .once
            .clear();
        let command =
            composed_command_for("app1", &assembled(&specs), &layout()).expect("command");
        let parts: Vec<&str> = command.split(';').collect();
        assert_eq!(
            parts,
            vec![
                "sh -c \"cd /gc/lib1 && ./install.sh",
                " cd /gc/lib2 && python setup.py develop",
                " cd /gc/app1",
                " export PATH=$PATH:/gc/app1",
                " if [ ! -f /var/run/devyard/docker_first_time_started ]",
                " then mkdir -p /var/run/devyard",
                " touch /var/run/devyard/docker_first_time_started",
                " fi",
                " always.sh\"",
            ]
        );
    }

    #[test]
    fn compile_command_escapes_quotes() {
        let mut specs = basic_specs();
        specs.apps.get_mut("app2").expect("app2").commands = Some(Commands {
            once: Vec::new(),
            always: names(&[r#"echo "hi""#]),
        });
        let command =
            composed_command_for("app2", &assembled(&specs), &layout()).expect("command");
        assert!(command.ends_with(r#"; echo \"hi\"""#), "got: {command}");
    }

    #[test]
    fn compile_command_escapes_backslashes() {
        let mut specs = basic_specs();
        specs.apps.get_mut("app2").expect("app2").commands = Some(Commands {
            once: Vec::new(),
            always: names(&[r#"printf "a\tb""#]),
        });
        let command =
            composed_command_for("app2", &assembled(&specs), &layout()).expect("command");
        assert!(
            command.ends_with(r#"; printf \"a\\tb\"""#),
            "got: {command}"
        );
    }

    #[test]
    fn escaping_covers_quotes_and_backslashes_only() {
        assert_eq!(escape_double_quoted(r#"a\b "c" $d"#), r#"a\\b \"c\" $d"#);
    }

    #[test]
    fn default_commands_keep_container_alive() {
        let command =
            composed_command_for("app2", &assembled(&basic_specs()), &layout()).expect("command");
        assert!(
            command.ends_with(&format!(
                "fi; {}\"",
                devyard_common::constants::KEEPALIVE_COMMAND
            )),
            "got: {command}"
        );
    }

    #[test]
    fn ports_list() {
        let ports = basic_ports();
        assert_eq!(ports_for("app1", &ports), vec!["8000:1", "8005:90"]);
        assert!(ports_for("app2", &ports).is_empty());
        assert!(ports_for("unmapped", &ports).is_empty());
    }

    #[test]
    fn lib_install_command() {
        let lib = AssembledLib {
            repo: Repo::new("some repo"),
            mount: "/mount/point".into(),
            install: Some("python install.py some args".into()),
            libs: indexmap::IndexSet::new(),
        };
        assert_eq!(
            install_command_for(&lib),
            "cd /mount/point && python install.py some args"
        );
    }

    #[test]
    fn lib_install_command_with_no_install() {
        let lib = AssembledLib {
            repo: Repo::new("some repo"),
            mount: "/mount/point".into(),
            install: None,
            libs: indexmap::IndexSet::new(),
        };
        assert_eq!(install_command_for(&lib), "");
    }

    #[test]
    fn composed_app_descriptor() {
        let specs = assembled(&basic_specs());
        let descriptor =
            service_descriptor_for("app1", &specs, &basic_ports(), &layout()).expect("descriptor");
        assert_eq!(descriptor.source, ImageSource::Image("awesomeGCimage".into()));
        assert_eq!(descriptor.links, vec!["app2", "service1", "service2"]);
        assert_eq!(
            descriptor.volumes,
            vec![
                "/cp/app1:/cp",
                "/Users/gc/app1:/gc/app1",
                "/Users/gc/lib1:/gc/lib1",
                "/Users/gc/lib2:/gc/lib2",
            ]
        );
        assert_eq!(descriptor.ports, vec!["8000:1", "8005:90"]);
        assert_eq!(
            descriptor.command,
            Some(composed_command_for("app1", &specs, &layout()).expect("command"))
        );
    }

    #[test]
    fn document_covers_apps_and_services() {
        let document =
            compose_document(&assembled(&basic_specs()), &basic_ports(), &layout()).expect("doc");
        let names: Vec<&str> = document.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["app1", "app2", "service1", "service2"]);

        let service = document.get("service1").expect("service1");
        assert_eq!(service.source, ImageSource::Image("service1:1".into()));
        assert!(service.command.is_none());
        assert!(service.links.is_empty());
    }

    #[test]
    fn document_serializes_flat_records() {
        let document =
            compose_document(&assembled(&basic_specs()), &basic_ports(), &layout()).expect("doc");
        let value = serde_yaml::to_value(&document).expect("yaml");
        let app1 = &value["app1"];
        assert_eq!(app1["image"].as_str(), Some("awesomeGCimage"));
        assert_eq!(app1["ports"][0].as_str(), Some("8000:1"));
        assert!(app1.get("source").is_none());
        assert!(value["service2"].get("command").is_none());
    }

    #[test]
    fn build_apps_emit_build_key() {
        let mut specs = basic_specs();
        let app2 = specs.apps.get_mut("app2").expect("app2");
        app2.image = None;
        app2.build = Some("/Users/gc/app2".into());
        let document =
            compose_document(&assembled(&specs), &basic_ports(), &layout()).expect("doc");
        let value = serde_yaml::to_value(&document).expect("yaml");
        assert_eq!(value["app2"]["build"].as_str(), Some("/Users/gc/app2"));
        assert!(value["app2"].get("image").is_none());
    }
}
