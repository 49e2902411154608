//! Station catalog: stream URLs, companion video pages and live titles.

const STREAM_BASE: &str = "https://stream.nightride.fm/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub name: String,
    pub stream_url: String,
    /// Watch page of the companion live video, if the station has one.
    pub video_url: Option<String>,
    /// Latest "artist - title" from the metadata feed.
    pub now_playing: String,
}

impl Station {
    fn new(name: &str, file: &str, video_url: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            stream_url: format!("{STREAM_BASE}{file}"),
            video_url: video_url.map(str::to_string),
            now_playing: String::new(),
        }
    }

    /// Lowercase stream file stem, e.g. `darksynth`. Matches the metadata feed's station ids.
    pub fn key(&self) -> String {
        let file = self
            .stream_url
            .rsplit('/')
            .next()
            .unwrap_or(self.stream_url.as_str())
            .to_ascii_lowercase();
        file.strip_suffix(".mp3").unwrap_or(&file).to_string()
    }

    /// Key used to pick the visualizer mask and palette.
    pub fn icon_key(&self) -> String {
        let key = self.key();
        if key == "nightride" {
            "nrfm".to_string()
        } else {
            key
        }
    }

    pub fn has_video(&self) -> bool {
        self.video_url.is_some()
    }
}

/// Owned list of stations; passed to whoever needs it, never global.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            Station::new(
                "Nightride FM",
                "nightride.mp3",
                Some("https://www.youtube.com/watch?v=uYfxDF_QR94"),
            ),
            Station::new(
                "Darksynth",
                "darksynth.mp3",
                Some("https://youtu.be/Nn87x5B26-c"),
            ),
            Station::new(
                "Chillsynth",
                "chillsynth.mp3",
                Some("https://youtu.be/UedTcufyrHc"),
            ),
            Station::new(
                "Datawave",
                "datawave.mp3",
                Some("https://youtu.be/Y9q6RYg2Pdg"),
            ),
            Station::new("EBSM", "ebsm.mp3", Some("https://youtu.be/1PkJmurhQfU")),
            Station::new("Horrorsynth", "horrorsynth.mp3", None),
            Station::new(
                "Spacesynth",
                "spacesynth.mp3",
                Some("https://youtu.be/5-anTj1QrWs"),
            ),
            Station::new("Rekt", "rekt.mp3", None),
            Station::new("Rektory", "rektory.mp3", None),
        ])
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Station> {
        self.stations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn index_of_key(&self, key: &str) -> Option<usize> {
        self.stations.iter().position(|station| station.key() == key)
    }

    /// Index `delta` steps away from `index`, wrapping in both directions.
    pub fn wrap_index(&self, index: usize, delta: isize) -> usize {
        let len = self.stations.len();
        if len == 0 {
            return 0;
        }
        (index as isize + delta).rem_euclid(len as isize) as usize
    }

    /// Store new now-playing text for every station named in `update`.
    /// Returns the indices that changed.
    pub fn apply_now_playing<'a, I>(&mut self, update: I) -> Vec<usize>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut changed = Vec::new();
        for (key, title) in update {
            if let Some(idx) = self.index_of_key(key) {
                if self.stations[idx].now_playing != *title {
                    self.stations[idx].now_playing = title.clone();
                    changed.push(idx);
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn keys_come_from_stream_file_names() {
        let catalog = StationCatalog::builtin();
        let first = catalog.get(0).expect("station");
        assert_eq!(first.key(), "nightride");
        assert_eq!(first.icon_key(), "nrfm");
        assert_eq!(catalog.get(1).map(Station::key).as_deref(), Some("darksynth"));
        assert_eq!(catalog.index_of_key("rektory"), Some(8));
    }

    #[test]
    fn wrap_index_cycles_both_ways() {
        let catalog = StationCatalog::builtin();
        assert_eq!(catalog.wrap_index(0, -1), catalog.len() - 1);
        assert_eq!(catalog.wrap_index(catalog.len() - 1, 1), 0);
        assert_eq!(catalog.wrap_index(3, 2), 5);
    }

    #[test]
    fn stations_without_video_are_flagged() {
        let catalog = StationCatalog::builtin();
        let horror = catalog.index_of_key("horrorsynth").and_then(|i| catalog.get(i));
        assert!(!horror.expect("horrorsynth").has_video());
        assert!(catalog.get(0).expect("nightride").has_video());
    }

    #[test]
    fn apply_now_playing_reports_changes_only() {
        let mut catalog = StationCatalog::builtin();
        let mut update = HashMap::new();
        update.insert("darksynth".to_string(), "Artist - Track".to_string());
        update.insert("unknown".to_string(), "x - y".to_string());
        assert_eq!(catalog.apply_now_playing(&update), vec![1]);
        assert_eq!(catalog.get(1).expect("darksynth").now_playing, "Artist - Track");
        assert!(catalog.apply_now_playing(&update).is_empty());
    }
}
