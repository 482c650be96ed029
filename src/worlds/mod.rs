pub mod store;

use serde::{Deserialize, Serialize};

use self::store::JsonStore;

/// A world as reported by the map service's `Worlds` listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct World {
    pub name: String,
    pub sector: String,
    pub hex: String,
    #[serde(rename = "UWP")]
    pub uwp: String,
    #[serde(default)]
    pub bases: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default, rename = "AllegianceName")]
    pub allegiance: String,
}

impl World {
    /// Cache key, `"<sector>/<hex>"`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.sector, self.hex)
    }

    pub fn starport(&self) -> Option<char> {
        self.uwp.chars().next()
    }

    pub fn tech_level(&self) -> Option<char> {
        self.uwp.rsplit('-').next().and_then(|tl| tl.chars().next())
    }
}

/// A location on the map: sector name plus hex, e.g. `Spinward Marches 1910`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub sector: String,
    pub hex: String,
}

/// The third-party map service worlds are imported from.
pub trait MapService {
    fn fetch_sector_data(&self, url: &str) -> anyhow::Result<Vec<u8>>;

    fn fetch_world_data(&self, coordinates: &Coordinates, radius: u32)
    -> anyhow::Result<Vec<World>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WorldsPayload {
    worlds: Vec<World>,
}

/// Decodes a `{"Worlds": [...]}` response body.
pub fn decode_worlds(bytes: &[u8]) -> anyhow::Result<Vec<World>> {
    let payload: WorldsPayload = serde_json::from_slice(bytes)?;
    Ok(payload.worlds)
}

/// Fetches the worlds around `coordinates` and caches them in `store`.
///
/// Returns the number of worlds written.
pub fn import_worlds(
    service: &impl MapService,
    store: &mut JsonStore<World>,
    coordinates: &Coordinates,
    radius: u32,
) -> anyhow::Result<usize> {
    let worlds = service.fetch_world_data(coordinates, radius)?;
    for world in &worlds {
        let key = world.key();
        if store.contains(&key) {
            store.update(&key, world.clone())?;
        } else {
            store.create(&key, world.clone())?;
        }
    }
    store.commit()?;
    log::info!(
        "Imported {} worlds within {} parsecs of {} {}",
        worlds.len(),
        radius,
        coordinates.sector,
        coordinates.hex
    );
    Ok(worlds.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "Worlds": [
            {"Name": "Regina", "Sector": "Spinward Marches", "Hex": "1910",
             "UWP": "A788899-C", "Bases": "NS", "Remarks": "Ri Pa Ph An Cp",
             "Zone": "", "AllegianceName": "Third Imperium"},
            {"Name": "Efate", "Sector": "Spinward Marches", "Hex": "1705",
             "UWP": "A646930-D"}
        ]
    }"#;

    struct CannedService;

    impl MapService for CannedService {
        fn fetch_sector_data(&self, _url: &str) -> anyhow::Result<Vec<u8>> {
            Ok(PAYLOAD.as_bytes().to_vec())
        }

        fn fetch_world_data(
            &self,
            _coordinates: &Coordinates,
            _radius: u32,
        ) -> anyhow::Result<Vec<World>> {
            decode_worlds(&self.fetch_sector_data("jumpworlds")?)
        }
    }

    #[test]
    fn test_decode_worlds() {
        let worlds = decode_worlds(PAYLOAD.as_bytes()).unwrap();
        assert_eq!(worlds.len(), 2);
        assert_eq!(worlds[0].name, "Regina");
        assert_eq!(worlds[0].allegiance, "Third Imperium");
        assert_eq!(worlds[0].starport(), Some('A'));
        assert_eq!(worlds[0].tech_level(), Some('C'));
        assert_eq!(worlds[1].bases, "");
        assert_eq!(worlds[1].key(), "Spinward Marches/1705");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_worlds(b"{\"Worlds\": 5}").is_err());
    }

    #[test]
    fn test_import_worlds_twice() {
        let path = std::env::temp_dir().join(format!("cepheus-import-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let coordinates = Coordinates {
            sector: "Spinward Marches".to_string(),
            hex: "1910".to_string(),
        };

        let mut store = JsonStore::open(&path).unwrap();
        assert_eq!(import_worlds(&CannedService, &mut store, &coordinates, 2).unwrap(), 2);
        assert_eq!(import_worlds(&CannedService, &mut store, &coordinates, 2).unwrap(), 2);
        assert_eq!(store.len(), 2);

        let reopened: JsonStore<World> = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.read("Spinward Marches/1910").unwrap().name, "Regina");
        let _ = std::fs::remove_file(&path);
    }
}
