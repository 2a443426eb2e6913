//! Integration tests for hfsm-engine: sets loaded from files on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hfsm_core::{ActorId, Automaton, AutomatonId, EventId, StateId, StateSpec, StaticFactory};
use hfsm_engine::{
    generate_blank_table, Actor, ActorFsm, AutomatonHandler, Engine, EventTarget, LoadErrorCode,
    LoadWarning, ResolveError, Roster, RuntimeConfig, SetDescription, SetId, SetLoader, Step,
};
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug)]
struct Player {
    id: ActorId,
    fsm: ActorFsm,
    log: Vec<String>,
}

impl Player {
    fn new(id: ActorId, fsm: ActorFsm) -> Self {
        Self {
            id,
            fsm,
            log: Vec::new(),
        }
    }
}

impl Actor for Player {
    fn id(&self) -> ActorId {
        self.id
    }

    fn fsm(&self) -> &ActorFsm {
        &self.fsm
    }

    fn fsm_mut(&mut self) -> &mut ActorFsm {
        &mut self.fsm
    }
}

const EVENTS: [&str; 2] = ["ball_won", "ball_lost"];
const STATES: [&str; 3] = ["waiting", "running", "tackling"];

fn factory() -> StaticFactory<Player> {
    let specs = STATES
        .iter()
        .map(|name| {
            let (enter, exit) = (name.to_string(), name.to_string());
            StateSpec::named(*name)
                .on_entrance(move |p: &mut Player| p.log.push(format!("enter:{enter}")))
                .on_exit(move |p: &mut Player| p.log.push(format!("exit:{exit}")))
        })
        .collect();
    StaticFactory::new(EVENTS.iter().map(|e| e.to_string()).collect(), specs)
}

/// A directory holding one set's files.
struct SetFiles {
    dir: TempDir,
}

impl SetFiles {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }
}

const OFFENSE_XML: &str = r#"
<automaton_set>
  <automaton name="attack">
    <lua_file>attack.lua</lua_file>
    <csv_file>attack.csv</csv_file>
    <start_state>waiting</start_state>
    <transition name="t_start">
      <lua_function_name>in_first_group</lua_function_name>
      <true><state>running</state></true>
      <false><state>waiting</state></false>
    </transition>
    <transition name="t_lost">
      <lua_function_name>always</lua_function_name>
      <true><automaton>defend</automaton></true>
      <false><state>running</state></false>
    </transition>
  </automaton>
  <automaton name="defend">
    <lua_file>defend.lua</lua_file>
    <csv_file>defend.csv</csv_file>
    <start_state>waiting</start_state>
    <transition name="t_won">
      <lua_function_name>always</lua_function_name>
      <true><automaton>attack</automaton><state>waiting</state></true>
      <false><state>tackling</state></false>
    </transition>
  </automaton>
  <start_automaton>attack</start_automaton>
</automaton_set>
"#;

const ATTACK_CSV: &str = "\
,ball_won,ball_lost
waiting,t_start,t_lost
running,,t_lost
tackling,,
";

const DEFEND_CSV: &str = "\
,ball_won,ball_lost
waiting,t_won,
running,t_won,
tackling,t_won,
";

const ATTACK_LUA: &str = r#"
function in_first_group(group, index)
  if group == 0 then return 1 end
  return 0
end

function always(group, index)
  return 1
end
"#;

const DEFEND_LUA: &str = "function always(group, index) return 1 end\n";

fn offense() -> SetFiles {
    let files = SetFiles::new();
    files.write("offense.xml", OFFENSE_XML);
    files.write("attack.csv", ATTACK_CSV);
    files.write("defend.csv", DEFEND_CSV);
    files.write("attack.lua", ATTACK_LUA);
    files.write("defend.lua", DEFEND_LUA);
    files
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_links_every_automaton() -> anyhow::Result<()> {
    let files = offense();
    let factory = factory();
    let loaded = SetLoader::new(&factory).load(files.path("offense.xml"))?;

    let set = &loaded.set;
    assert_eq!(set.name(), "offense");
    assert_eq!(set.len(), 2);
    assert_eq!(set.entry_point(), Some((AutomatonId(0), StateId(0))));

    let attack = set.find_automaton_by_name("attack").unwrap();
    assert!(attack.is_complete());
    let waiting = attack.find_state_by_name("waiting").unwrap();
    let t_start = attack.find_transition_by_name("t_start").unwrap().id();
    assert_eq!(waiting.transition_for(EventId(0)), Some(t_start));
    assert_eq!(attack.find_state_by_name("tackling").unwrap().transition_for(EventId(0)), None);

    // Only `tackling` of attack has no way in.
    let unreachable: Vec<_> = loaded
        .diagnostics
        .iter()
        .filter_map(|w| match w {
            LoadWarning::UnreachableState { automaton, state } => {
                Some((automaton.as_str(), state.as_str()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(unreachable, vec![("attack", "tackling")]);
    Ok(())
}

#[test]
fn test_missing_start_state_is_fatal() {
    let files = offense();
    files.write(
        "broken.xml",
        &OFFENSE_XML.replacen("<start_state>waiting</start_state>", "", 1),
    );
    let factory = factory();
    let err = SetLoader::new(&factory).load(files.path("broken.xml")).unwrap_err();
    assert_eq!(err.code(), LoadErrorCode::MissingStartState);
}

#[test]
fn test_unknown_branch_automaton_is_fatal() {
    let files = offense();
    files.write(
        "broken.xml",
        &OFFENSE_XML.replace("<automaton>defend</automaton>", "<automaton>nowhere</automaton>"),
    );
    let factory = factory();
    let err = SetLoader::new(&factory).load(files.path("broken.xml")).unwrap_err();
    assert_eq!(err.code(), LoadErrorCode::UnknownAutomaton);
}

#[test]
fn test_script_errors_are_fatal() {
    let files = offense();
    files.write("attack.lua", "function in_first_group(");
    let factory = factory();
    let err = SetLoader::new(&factory).load(files.path("offense.xml")).unwrap_err();
    assert_eq!(err.code(), LoadErrorCode::Script);
}

#[test]
fn test_unknown_table_cell_degrades_to_warning() {
    let files = offense();
    files.write("attack.csv", &ATTACK_CSV.replace("running,,t_lost", "running,t_typo,t_lost"));
    let factory = factory();
    let loaded = SetLoader::new(&factory).load(files.path("offense.xml")).unwrap();

    let attack = loaded.set.find_automaton_by_name("attack").unwrap();
    assert_eq!(attack.find_state_by_name("running").unwrap().transition_for(EventId(0)), None);
    assert!(loaded.diagnostics.iter().any(|w| matches!(
        w,
        LoadWarning::UnknownTransitionInTable { transition, state, .. }
            if transition == "t_typo" && state == "running"
    )));
}

#[test]
fn test_bad_table_character_is_fatal() {
    let files = offense();
    files.write("attack.csv", &ATTACK_CSV.replace("tackling,,", "tackl1ng,,"));
    let factory = factory();
    let err = SetLoader::new(&factory).load(files.path("offense.xml")).unwrap_err();
    assert_eq!(err.code(), LoadErrorCode::Table);
}

#[test]
fn test_missing_predicate_is_reported() {
    let files = offense();
    files.write("defend.lua", "-- nothing here\n");
    let factory = factory();
    let loaded = SetLoader::new(&factory).load(files.path("offense.xml")).unwrap();
    assert!(loaded.diagnostics.iter().any(|w| matches!(
        w,
        LoadWarning::PredicateNotDefined { automaton, predicate, .. }
            if automaton == "defend" && predicate == "always"
    )));
}

#[test]
fn test_blank_table_loads_with_every_slot_empty() {
    let files = offense();
    let factory = factory();
    let mut template = Automaton::create(AutomatonId(0), &factory);
    template.set_name("attack");
    fs::remove_file(files.path("attack.csv")).unwrap();
    generate_blank_table(&files.path("attack.csv"), &template).unwrap();

    let loaded = SetLoader::new(&factory).load(files.path("offense.xml")).unwrap();
    let attack = loaded.set.find_automaton_by_name("attack").unwrap();
    assert!(attack
        .states()
        .iter()
        .all(|s| s.transitions().iter().all(Option::is_none)));
}

#[test]
fn test_predicate_names_cover_whole_set() {
    let description = SetDescription::read(&offense().path("offense.xml")).unwrap();
    assert_eq!(description.predicate_names(), vec!["in_first_group", "always"]);
}

#[test]
fn test_each_structural_defect_has_its_own_code() {
    let cases: [(&str, &str, LoadErrorCode); 9] = [
        (
            "<start_automaton>attack</start_automaton>",
            "",
            LoadErrorCode::MissingStartAutomaton,
        ),
        (
            "<start_automaton>attack</start_automaton>",
            "<start_automaton>midfield</start_automaton>",
            LoadErrorCode::InvalidStartAutomaton,
        ),
        (
            "<csv_file>attack.csv</csv_file>",
            "",
            LoadErrorCode::MissingTableFile,
        ),
        (
            "<lua_file>defend.lua</lua_file>",
            "",
            LoadErrorCode::MissingScriptFile,
        ),
        (
            "<start_state>waiting</start_state>",
            "<start_state>sprinting</start_state>",
            LoadErrorCode::InvalidStartState,
        ),
        (
            r#"<transition name="t_won">"#,
            "<transition>",
            LoadErrorCode::MissingTransitionName,
        ),
        (
            "<true><state>running</state></true>",
            "<true><state>sprinting</state></true>",
            LoadErrorCode::UnknownBranchTarget,
        ),
        // `t_start` only exists in attack, the owner; the branch switches to
        // defend, so the name must be looked up there.
        (
            "<true><automaton>defend</automaton></true>",
            "<true><automaton>defend</automaton><transition>t_start</transition></true>",
            LoadErrorCode::UnknownBranchTarget,
        ),
        (
            "<false><state>tackling</state></false>",
            "<false></false>",
            LoadErrorCode::MalformedTransition,
        ),
    ];

    let factory = factory();
    for (from, to, code) in cases {
        let files = offense();
        assert!(OFFENSE_XML.contains(from), "fixture lacks {from}");
        files.write("broken.xml", &OFFENSE_XML.replacen(from, to, 1));
        let err = SetLoader::new(&factory)
            .load(files.path("broken.xml"))
            .unwrap_err();
        assert_eq!(err.code(), code, "{from} -> {to}: {err}");
    }
}

#[test]
fn test_switched_branch_chains_into_target_automaton() {
    let files = offense();
    files.write(
        "offense.xml",
        &OFFENSE_XML.replace(
            "<true><automaton>defend</automaton></true>",
            "<true><automaton>defend</automaton><transition>t_won</transition></true>",
        ),
    );
    let factory = factory();
    let set = SetLoader::new(&factory)
        .load(files.path("offense.xml"))
        .unwrap()
        .set;

    // attack::t_lost switches to defend and chains into defend::t_won,
    // whose true branch returns to attack::waiting.
    let mut player = Player::new(ActorId::new(0, 0), ActorFsm::enter(SetId(0), &set).unwrap());
    let step = Engine::new().advance(&set, EventId(1), &mut player);
    assert_eq!(
        step,
        Step::Moved {
            automaton: AutomatonId(0),
            state: StateId(0)
        }
    );
}

/// Actor types need no `Debug` for load results to be inspected.
#[allow(dead_code)]
struct Bystander;

#[test]
fn test_load_results_need_no_debug_actor() {
    let files = offense();
    let factory = StaticFactory::<Bystander>::from_names(EVENTS, STATES);
    let err = SetLoader::new(&factory)
        .load(files.path("missing.xml"))
        .unwrap_err();
    assert_eq!(err.code(), LoadErrorCode::Io);

    let loaded = SetLoader::new(&factory)
        .load(files.path("offense.xml"))
        .unwrap();
    assert!(format!("{loaded:?}").starts_with("LoadedSet"));
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_event_moves_actor_and_fires_callbacks_once() {
    let files = offense();
    let factory = factory();
    let set = SetLoader::new(&factory).load(files.path("offense.xml")).unwrap().set;
    let engine = Engine::new();

    let mut first = Player::new(ActorId::new(0, 3), ActorFsm::enter(SetId(0), &set).unwrap());
    let step = engine.advance(&set, EventId(0), &mut first);
    assert_eq!(
        step,
        Step::Moved {
            automaton: AutomatonId(0),
            state: StateId(1)
        }
    );
    assert_eq!(first.log, vec!["exit:waiting", "enter:running"]);

    // The predicate sees the group: the same event keeps group 1 waiting.
    let mut second = Player::new(ActorId::new(1, 3), ActorFsm::enter(SetId(0), &set).unwrap());
    let step = engine.advance(&set, EventId(0), &mut second);
    assert_eq!(step.state(), StateId(0));
    assert_eq!(second.log, vec!["exit:waiting", "enter:waiting"]);

    // Unbound slot: nothing fires.
    let step = engine.advance(&set, EventId(0), &mut first);
    assert_eq!(step, Step::Unbound { state: StateId(1) });
    assert_eq!(first.log.len(), 2);
}

#[test]
fn test_automaton_switch_round_trip() {
    let files = offense();
    let factory = factory();
    let set = SetLoader::new(&factory).load(files.path("offense.xml")).unwrap().set;
    let engine = Engine::new();
    let defend = set.find_automaton_by_name("defend").unwrap().id();

    let mut player = Player::new(ActorId::new(0, 0), ActorFsm::enter(SetId(0), &set).unwrap());
    engine.advance(&set, EventId(0), &mut player);

    // ball_lost in attack::running switches to defend::running.
    let step = engine.advance(&set, EventId(1), &mut player);
    assert_eq!(
        step,
        Step::Moved {
            automaton: defend,
            state: StateId(1)
        }
    );

    // ball_won in defend goes back to attack::waiting.
    let step = engine.advance(&set, EventId(0), &mut player);
    assert_eq!(
        step,
        Step::Moved {
            automaton: AutomatonId(0),
            state: StateId(0)
        }
    );
    assert_eq!(player.fsm.automaton(), AutomatonId(0));
}

#[test]
fn test_transition_cycle_terminates() {
    let files = offense();
    files.write(
        "cycle.xml",
        r#"
        <automaton_set>
          <automaton name="attack">
            <lua_file>attack.lua</lua_file>
            <csv_file>cycle.csv</csv_file>
            <start_state>waiting</start_state>
            <transition name="t_a">
              <lua_function_name>always</lua_function_name>
              <true><transition>t_b</transition></true>
              <false><state>waiting</state></false>
            </transition>
            <transition name="t_b">
              <lua_function_name>always</lua_function_name>
              <true><transition>t_a</transition></true>
              <false><state>waiting</state></false>
            </transition>
          </automaton>
          <start_automaton>attack</start_automaton>
        </automaton_set>
        "#,
    );
    files.write("cycle.csv", ",ball_won,ball_lost\nwaiting,t_a,\n");
    let factory = factory();
    let set = SetLoader::new(&factory).load(files.path("cycle.xml")).unwrap().set;

    let mut player = Player::new(ActorId::new(0, 0), ActorFsm::enter(SetId(0), &set).unwrap());
    let step = Engine::new().advance(&set, EventId(0), &mut player);
    assert_eq!(
        step,
        Step::Stayed {
            state: StateId(0),
            error: ResolveError::DepthExceeded { depth: 5 }
        }
    );
    assert_eq!(player.fsm.position(), (AutomatonId(0), StateId(0)));
}

// ============================================================================
// Runtime
// ============================================================================

#[test]
fn test_handler_from_config_ticks_timed_events() -> anyhow::Result<()> {
    let files = offense();
    files.write(
        "runtime.toml",
        r#"
        [engine]
        max_transition_depth = 5

        [[sets]]
        name = "offense"
        path = "offense.xml"
        "#,
    );
    let config = RuntimeConfig::load(files.root().join("runtime.toml"))?;
    let factory = factory();
    let (mut handler, diagnostics) =
        AutomatonHandler::<Player>::from_config(&config, &factory, None)?;
    assert_eq!(diagnostics.len(), 1);

    let id = handler.set_id("offense").unwrap();
    let make = |group, index| Player::new(ActorId::new(group, index), handler.enter(id).unwrap());
    let mut roster = Roster::new(vec![make(0, 0), make(0, 1)], vec![make(1, 0)]);

    handler.schedule(
        EventId(0),
        Duration::from_millis(100),
        Duration::from_millis(50),
        EventTarget::Broadcast,
    );
    handler.schedule(
        EventId(1),
        Duration::from_millis(100),
        Duration::from_millis(100),
        EventTarget::Actor(ActorId::new(0, 1)),
    );

    let report = handler.tick(Duration::from_millis(150), Duration::from_millis(16), &mut roster);
    assert_eq!(report.released, 1);
    assert_eq!(report.delivered, 3);
    // Group 1 resolves back onto waiting, which still counts as a move.
    assert_eq!(report.moved, 3);
    assert_eq!(handler.timed_queue().len(), 1);

    let report = handler.tick(Duration::from_millis(200), Duration::from_millis(16), &mut roster);
    assert_eq!(report.released, 1);
    let switched = roster.actor(ActorId::new(0, 1)).unwrap();
    assert_eq!(switched.fsm.automaton(), AutomatonId(1));
    assert_eq!(
        roster.actor(ActorId::new(1, 0)).unwrap().fsm.position(),
        (AutomatonId(0), StateId(0))
    );
    Ok(())
}
