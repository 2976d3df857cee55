//! Test helpers for seeding databases and input files.

use camino::{Utf8Path, Utf8PathBuf};
use kerbside_core::{BuildRequest, Container, ContainerStatus, GeoPoint};
use tempfile::TempDir;

use crate::import::{ImportArgs, run_import_with};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

pub(super) fn point(latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint::new(latitude, longitude).expect("valid coordinate")
}

pub(super) fn container(id: u64, latitude: f64, longitude: f64, volume: f64) -> Container {
    Container::new(id, point(latitude, longitude), volume, ContainerStatus::Ready)
        .expect("valid container")
}

/// Containers A and B from the reference planning scenario.
pub(super) fn scenario_containers() -> Vec<Container> {
    vec![
        container(1, 11.54752, -72.91351, 1000.0),
        container(2, 11.53855, -72.91672, 1000.0),
    ]
}

pub(super) fn build_request(route_id: u64, capacity: f64) -> BuildRequest {
    BuildRequest {
        route_id,
        truck_id: 21,
        capacity,
        origin: point(11.5, -72.9),
    }
}

/// A temporary directory holding a database path and JSON inputs.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.path("kerbside.db")
    }

    pub(super) fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Utf8PathBuf {
        let target = self.path(name);
        let payload = serde_json::to_vec_pretty(value).expect("serialise test input");
        write_utf8(&target, &payload);
        target
    }

    /// Import `containers` through the `import` command.
    pub(super) fn import(&self, containers: &[Container]) {
        let source = self.write_json("containers.json", &containers);
        let args = ImportArgs {
            containers: Some(source),
            database: Some(self.database()),
        };
        let mut sink = Vec::new();
        run_import_with(args, &mut sink).expect("import succeeds");
    }
}
