use std::collections::BTreeSet;

/// Which annotation layers of one chain are shown.
///
/// Mutations are one switch; ligand sites are toggled individually by site
/// id. Sites start hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationVisibility {
    show_mutations: bool,
    visible_sites: BTreeSet<String>,
}

impl Default for AnnotationVisibility {
    fn default() -> Self {
        Self {
            show_mutations: true,
            visible_sites: BTreeSet::new(),
        }
    }
}

impl AnnotationVisibility {
    /// Whether mutations are shown.
    #[must_use]
    pub fn show_mutations(&self) -> bool {
        self.show_mutations
    }

    /// Show or hide mutations.
    pub fn set_show_mutations(&mut self, show: bool) {
        self.show_mutations = show;
    }

    /// Whether a ligand site is shown.
    #[must_use]
    pub fn is_ligand_visible(&self, site_id: &str) -> bool {
        self.visible_sites.contains(site_id)
    }

    /// Flip one ligand site; returns the new state.
    pub fn toggle_ligand(&mut self, site_id: &str) -> bool {
        if self.visible_sites.remove(site_id) {
            false
        } else {
            let _ = self.visible_sites.insert(site_id.to_owned());
            true
        }
    }

    /// Show every site in `site_ids` and mutations.
    pub fn show_all<'a>(&mut self, site_ids: impl IntoIterator<Item = &'a str>) {
        self.visible_sites
            .extend(site_ids.into_iter().map(str::to_owned));
        self.show_mutations = true;
    }

    /// Hide every site and mutations.
    pub fn hide_all(&mut self) {
        self.visible_sites.clear();
        self.show_mutations = false;
    }

    /// Ids of visible sites, sorted.
    pub fn visible_sites(&self) -> impl Iterator<Item = &str> + '_ {
        self.visible_sites.iter().map(String::as_str)
    }
}
