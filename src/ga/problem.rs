//! Exam GA problem definition.
//!
//! Bridges the input catalogs to the GA. [`ExamProblem`] owns the sections,
//! rooms and availability for one run, fixes the gene order, and groups
//! gene positions into course-groups so that construction, mutation and
//! decoding all consult the same grouping.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::ExamConfig;
use crate::models::{
    AvailabilityIndex, Conflict, CourseGroupKey, ProctorAvailability, ProctorId, Room, RoomId,
    Section, SectionId, SlotCatalog, TimeWindow,
};

/// Input catalogs for one run, as supplied by the repository layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamCatalog {
    /// Sections to schedule.
    pub sections: Vec<Section>,
    /// Usable exam dates (any order).
    pub dates: Vec<NaiveDate>,
    /// Room catalog.
    pub rooms: Vec<Room>,
    /// Building id → building name.
    #[serde(default)]
    pub buildings: HashMap<String, String>,
    /// Proctor availability entries.
    #[serde(default)]
    pub availability: Vec<ProctorAvailability>,
    /// Proctors belonging to the college. `None` accepts everyone listed.
    #[serde(default)]
    pub proctor_pool: Option<Vec<ProctorId>>,
    /// Program id → college id, for the year-level spread check.
    #[serde(default)]
    pub program_colleges: HashMap<String, String>,
}

impl ExamCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Adds a usable date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.dates.push(date);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Names a building.
    pub fn with_building(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.buildings.insert(id.into(), name.into());
        self
    }

    /// Adds an availability entry.
    pub fn with_availability(mut self, entry: ProctorAvailability) -> Self {
        self.availability.push(entry);
        self
    }

    /// Restricts proctors to a college pool.
    pub fn with_proctor_pool(mut self, pool: impl IntoIterator<Item = ProctorId>) -> Self {
        self.proctor_pool = Some(pool.into_iter().collect());
        self
    }

    /// Maps a program to its college.
    pub fn with_program_college(
        mut self,
        program_id: impl Into<String>,
        college_id: impl Into<String>,
    ) -> Self {
        self.program_colleges
            .insert(program_id.into(), college_id.into());
        self
    }
}

/// Gene positions sharing one course-group.
#[derive(Debug, Clone)]
pub struct CourseGroup {
    /// Group key.
    pub key: CourseGroupKey,
    /// Gene positions of the members, ascending.
    pub members: Vec<usize>,
}

/// Problem definition for one exam-scheduling run.
///
/// Gene position `i` always refers to the same section: day classes first,
/// then night classes, each in catalog order. Sections with no admissible
/// room or no start time that fits are not given a position.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use exam_schedule::config::ExamConfig;
/// use exam_schedule::ga::{ExamCatalog, ExamProblem};
/// use exam_schedule::models::{ProctorAvailability, Room, Section};
///
/// let date = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
/// let catalog = ExamCatalog::new()
///     .with_section(Section::new(1, "IT101", "BSIT").with_students(30).with_room("R1"))
///     .with_date(date)
///     .with_room(Room::new("R1", 50, "B1"))
///     .with_availability(ProctorAvailability::new(7).on(date).at("Morning"));
///
/// let problem = ExamProblem::new(catalog, ExamConfig::new(60));
/// assert_eq!(problem.gene_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ExamProblem {
    sections: Vec<Section>,
    dates: Vec<NaiveDate>,
    rooms: HashMap<RoomId, Room>,
    buildings: HashMap<String, String>,
    program_colleges: HashMap<String, String>,
    availability: AvailabilityIndex,
    slots: SlotCatalog,
    config: ExamConfig,
    section_index: HashMap<SectionId, usize>,
    gene_order: Vec<usize>,
    gene_groups: Vec<usize>,
    section_groups: HashMap<SectionId, usize>,
    groups: Vec<CourseGroup>,
    day_times: Vec<NaiveTime>,
    night_times: Vec<NaiveTime>,
}

impl ExamProblem {
    /// Creates a problem with the default slot catalog.
    pub fn new(catalog: ExamCatalog, config: ExamConfig) -> Self {
        let ExamCatalog {
            sections,
            mut dates,
            rooms,
            buildings,
            availability,
            proctor_pool,
            program_colleges,
        } = catalog;

        dates.sort();
        dates.dedup();

        let pool: Option<HashSet<ProctorId>> = proctor_pool.map(|p| p.into_iter().collect());
        let availability = AvailabilityIndex::build(&availability, pool.as_ref());

        let mut problem = Self {
            section_index: HashMap::new(),
            sections,
            dates,
            rooms: rooms.into_iter().map(|r| (r.room_id.clone(), r)).collect(),
            buildings,
            program_colleges,
            availability,
            slots: SlotCatalog::default(),
            config,
            gene_order: Vec::new(),
            gene_groups: Vec::new(),
            section_groups: HashMap::new(),
            groups: Vec::new(),
            day_times: Vec::new(),
            night_times: Vec::new(),
        };
        problem.refresh();
        problem
    }

    /// Replaces the slot catalog.
    pub fn with_slot_catalog(mut self, slots: SlotCatalog) -> Self {
        self.slots = slots;
        self.refresh();
        self
    }

    /// Recomputes candidate times, gene order and course-groups.
    fn refresh(&mut self) {
        let duration = self.config.duration_minutes;
        self.day_times = self.slots.candidate_times(false, duration);
        self.night_times = self.slots.candidate_times(true, duration);

        self.section_index.clear();
        for (idx, section) in self.sections.iter().enumerate() {
            self.section_index.entry(section.id).or_insert(idx);
        }

        let placeable = |s: &Section| {
            s.has_rooms() && !self.candidate_times(s.is_night_class).is_empty()
        };
        let mut seen = HashSet::new();
        let day = self
            .sections
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_night_class);
        let night = self
            .sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_night_class);
        let gene_order: Vec<usize> = day
            .chain(night)
            .filter(|(_, s)| placeable(s) && seen.insert(s.id))
            .map(|(idx, _)| idx)
            .collect();

        let mut key_to_group: HashMap<CourseGroupKey, usize> = HashMap::new();
        let mut groups: Vec<CourseGroup> = Vec::new();
        let mut gene_groups = Vec::with_capacity(gene_order.len());
        let mut section_groups = HashMap::with_capacity(gene_order.len());
        for (pos, &idx) in gene_order.iter().enumerate() {
            let key = self.sections[idx].group_key();
            let group = *key_to_group.entry(key.clone()).or_insert_with(|| {
                groups.push(CourseGroup {
                    key,
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[group].members.push(pos);
            gene_groups.push(group);
            section_groups.insert(self.sections[idx].id, group);
        }

        self.gene_order = gene_order;
        self.gene_groups = gene_groups;
        self.section_groups = section_groups;
        self.groups = groups;
    }

    /// All sections in catalog order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Section by id.
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.section_index.get(&id).map(|&idx| &self.sections[idx])
    }

    /// Sorted, deduplicated usable dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Exam configuration.
    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    /// Slot catalog.
    pub fn slots(&self) -> &SlotCatalog {
        &self.slots
    }

    /// Proctor availability lookup.
    pub fn availability(&self) -> &AvailabilityIndex {
        &self.availability
    }

    /// Number of gene positions.
    pub fn gene_count(&self) -> usize {
        self.gene_order.len()
    }

    /// Section at a gene position.
    pub fn section_at(&self, pos: usize) -> &Section {
        &self.sections[self.gene_order[pos]]
    }

    /// Course-group of a gene position.
    pub fn group_of(&self, pos: usize) -> &CourseGroup {
        &self.groups[self.gene_groups[pos]]
    }

    /// Course-group key of a placeable section.
    pub fn group_key(&self, id: SectionId) -> Option<&CourseGroupKey> {
        self.section_groups
            .get(&id)
            .map(|&group| &self.groups[group].key)
    }

    /// Course-groups in order of first appearance.
    pub fn groups(&self) -> &[CourseGroup] {
        &self.groups
    }

    /// Whether a section holds a gene position.
    pub fn is_placeable(&self, id: SectionId) -> bool {
        self.section_groups.contains_key(&id)
    }

    /// Valid start times for day or night classes, in catalog order.
    pub fn candidate_times(&self, is_night_class: bool) -> &[NaiveTime] {
        if is_night_class {
            &self.night_times
        } else {
            &self.day_times
        }
    }

    /// Candidate times with the preferred start first.
    ///
    /// The preferred start is the configured one when it is a candidate,
    /// otherwise the first candidate in catalog order.
    pub fn preferred_first(&self, is_night_class: bool) -> Vec<NaiveTime> {
        let times = self.candidate_times(is_night_class);
        let preferred = self
            .config
            .preferred_start_time
            .filter(|t| times.contains(t))
            .or_else(|| times.first().copied());
        match preferred {
            Some(p) => std::iter::once(p)
                .chain(times.iter().copied().filter(|&t| t != p))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Occupied window of an exam starting at `start`.
    #[inline]
    pub fn window(&self, start: NaiveTime) -> TimeWindow {
        TimeWindow::for_exam(start, self.config.duration_minutes)
    }

    /// Room by id.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Whether a room seats `students`; rooms missing from the catalog
    /// seat nobody.
    pub fn room_seats(&self, id: &str, students: u32) -> bool {
        self.room(id).map_or(students == 0, |r| r.seats(students))
    }

    /// Building label for a room: `"<name> (<id>)"`.
    pub fn building_label(&self, room_id: &str) -> String {
        match self.room(room_id) {
            Some(room) => {
                let name = self
                    .buildings
                    .get(&room.building_id)
                    .map(String::as_str)
                    .unwrap_or("Unknown Building");
                format!("{} ({})", name, room.building_id)
            }
            None => "Unknown Building".to_string(),
        }
    }

    /// College of a program, `"unknown"` when unmapped.
    pub fn college_of(&self, program_id: &str) -> &str {
        self.program_colleges
            .get(program_id)
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    /// Why a section holds no gene position.
    pub fn placement_blockers(&self, section: &Section) -> Vec<Conflict> {
        let mut reasons = Vec::new();
        if !section.has_rooms() {
            reasons.push(Conflict::NoRoom);
        }
        if self.candidate_times(section.is_night_class).is_empty() {
            reasons.push(if section.is_night_class {
                Conflict::NoEveningSlot
            } else {
                Conflict::PastCutoff
            });
        }
        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample_catalog() -> ExamCatalog {
        ExamCatalog::new()
            .with_section(
                Section::new(1, "IT101", "BSIT")
                    .with_class_section("BSIT 1A")
                    .night_class()
                    .with_room("R1"),
            )
            .with_section(
                Section::new(2, "IT101", "BSIT")
                    .with_class_section("BSIT 1B")
                    .with_room("R1"),
            )
            .with_section(Section::new(3, "IT102", "BSIT").with_class_section("BSIT 2A"))
            .with_section(
                Section::new(4, "IT101", "BSIT")
                    .with_class_section("BSIT 1C")
                    .with_room("R2"),
            )
            .with_date(d(4))
            .with_date(d(2))
            .with_date(d(4))
            .with_room(Room::new("R1", 40, "B1"))
            .with_building("B1", "Main Hall")
    }

    #[test]
    fn test_dates_sorted_and_deduplicated() {
        let problem = ExamProblem::new(sample_catalog(), ExamConfig::new(60));
        assert_eq!(problem.dates(), &[d(2), d(4)]);
    }

    #[test]
    fn test_gene_order_day_before_night() {
        let problem = ExamProblem::new(sample_catalog(), ExamConfig::new(60));
        // Section 3 has no rooms and is left out.
        assert_eq!(problem.gene_count(), 3);
        assert_eq!(problem.section_at(0).id, 2);
        assert_eq!(problem.section_at(1).id, 4);
        assert_eq!(problem.section_at(2).id, 1);
        assert!(!problem.is_placeable(3));
    }

    #[test]
    fn test_course_groups() {
        let problem = ExamProblem::new(sample_catalog(), ExamConfig::new(60));
        let groups = problem.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members, vec![0, 1]);
        assert!(!groups[0].key.is_night_class);
        assert_eq!(groups[1].members, vec![2]);
        assert!(groups[1].key.is_night_class);
        assert_eq!(problem.group_of(1).key, groups[0].key);
    }

    #[test]
    fn test_preferred_first() {
        let cfg = ExamConfig::new(60).with_preferred_start(t(13, 0));
        let problem = ExamProblem::new(sample_catalog(), cfg);

        let day = problem.preferred_first(false);
        assert_eq!(day[0], t(13, 0));
        assert_eq!(day.len(), problem.candidate_times(false).len());

        // 13:00 is not an evening slot, so night falls back to catalog order.
        assert_eq!(problem.preferred_first(true)[0], t(18, 0));
    }

    #[test]
    fn test_long_exam_blocks_night_sections() {
        let problem = ExamProblem::new(sample_catalog(), ExamConfig::new(240));
        assert!(problem.candidate_times(true).is_empty());
        assert!(!problem.is_placeable(1));
        let night = problem.section(1).unwrap();
        assert_eq!(problem.placement_blockers(night), vec![Conflict::NoEveningSlot]);
    }

    #[test]
    fn test_building_label_and_capacity() {
        let problem = ExamProblem::new(sample_catalog(), ExamConfig::new(60));
        assert_eq!(problem.building_label("R1"), "Main Hall (B1)");
        assert_eq!(problem.building_label("R2"), "Unknown Building");
        assert!(problem.room_seats("R1", 40));
        assert!(!problem.room_seats("R1", 41));
        assert!(!problem.room_seats("R2", 1));
        assert_eq!(problem.college_of("BSIT"), "unknown");
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "sections": [{"id": 1, "course_id": "C1", "program_id": "P1",
                          "sections": ["P1 1A"], "total_students": 20,
                          "possible_rooms": ["R1"]}],
            "dates": ["2026-11-02"],
            "rooms": [{"room_id": "R1", "capacity": 30, "building_id": "B1"}],
            "availability": [{"proctor_id": 5, "dates": ["2026-11-02"], "time_slots": ["Morning"]}],
            "proctor_pool": [5]
        }"#;
        let catalog: ExamCatalog = serde_json::from_str(json).unwrap();
        let problem = ExamProblem::new(catalog, ExamConfig::new(60));
        assert_eq!(problem.gene_count(), 1);
        assert_eq!(problem.availability().proctor_count(), 1);
    }
}
