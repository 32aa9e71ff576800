//! In-memory adapter that records every call, for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::adapter::{Adapter, AdapterCall, Tuning};
use crate::error::BackendError;
use crate::fixtures::{example_student, generate_students, FieldMap, Student, Value};

/// Row storage shared by every adapter built from it.
#[derive(Clone, Default)]
pub(crate) struct SharedStore(Rc<RefCell<Vec<Student>>>);

impl SharedStore {
    pub(crate) fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

/// Calls observed by one adapter.
#[derive(Default)]
pub(crate) struct Calls {
    insert: Cell<usize>,
    batch_sizes: RefCell<Vec<usize>>,
    list: Cell<usize>,
    map_list: Cell<usize>,
    delete: Cell<usize>,
    tunings: RefCell<Vec<Tuning>>,
}

impl Calls {
    pub(crate) fn count(&self, call: AdapterCall) -> usize {
        match call {
            AdapterCall::Insert => self.insert.get(),
            AdapterCall::BatchInsert => self.batch_sizes.borrow().len(),
            AdapterCall::List => self.list.get(),
            AdapterCall::MapList => self.map_list.get(),
            AdapterCall::Delete => self.delete.get(),
        }
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.borrow().clone()
    }

    pub(crate) fn tunings(&self) -> Vec<Tuning> {
        self.tunings.borrow().clone()
    }

    /// Total calls of any kind.
    pub(crate) fn total(&self) -> usize {
        [
            AdapterCall::Insert,
            AdapterCall::BatchInsert,
            AdapterCall::List,
            AdapterCall::MapList,
            AdapterCall::Delete,
        ]
        .iter()
        .map(|&call| self.count(call))
        .sum()
    }

    /// Forget everything recorded so far, typically the probe cycle.
    pub(crate) fn reset(&self) {
        self.insert.set(0);
        self.batch_sizes.borrow_mut().clear();
        self.list.set(0);
        self.map_list.set(0);
        self.delete.set(0);
        self.tunings.borrow_mut().clear();
    }

    fn bump(&self, call: AdapterCall) -> usize {
        let cell = match call {
            AdapterCall::Insert => &self.insert,
            AdapterCall::List => &self.list,
            AdapterCall::MapList => &self.map_list,
            AdapterCall::Delete => &self.delete,
            AdapterCall::BatchInsert => return self.batch_sizes.borrow().len(),
        };
        cell.set(cell.get() + 1);
        cell.get()
    }
}

pub(crate) struct RecordingAdapter {
    name: String,
    store: SharedStore,
    calls: Rc<Calls>,
    fault: Option<(AdapterCall, usize)>,
    insert_result: usize,
    tunable: bool,
}

impl RecordingAdapter {
    pub(crate) fn new(name: &str, store: &SharedStore) -> Self {
        Self {
            name: name.to_string(),
            store: store.clone(),
            calls: Rc::new(Calls::default()),
            fault: None,
            insert_result: 1,
            tunable: false,
        }
    }

    /// Every call of `call` fails.
    pub(crate) fn failing_on(self, call: AdapterCall) -> (Box<dyn Adapter>, Rc<Calls>) {
        self.failing_after(call, 0).build()
    }

    /// Calls of `call` succeed `ok_calls` times, then fail.
    pub(crate) fn failing_after(mut self, call: AdapterCall, ok_calls: usize) -> Self {
        self.fault = Some((call, ok_calls));
        self
    }

    pub(crate) fn with_insert_result(mut self, affected: usize) -> Self {
        self.insert_result = affected;
        self
    }

    /// Accept tuning switches.
    pub(crate) fn tunable(mut self) -> Self {
        self.tunable = true;
        self
    }

    pub(crate) fn build(self) -> (Box<dyn Adapter>, Rc<Calls>) {
        let calls = Rc::clone(&self.calls);
        (Box::new(self), calls)
    }

    fn check(&self, call: AdapterCall, nth: usize) -> Result<(), BackendError> {
        match self.fault {
            Some((faulty, ok_calls)) if faulty == call && nth > ok_calls => Err(
                BackendError::Unavailable(format!("injected {} fault", call)),
            ),
            _ => Ok(()),
        }
    }
}

impl Adapter for RecordingAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self) -> Result<usize, BackendError> {
        let nth = self.calls.bump(AdapterCall::Insert);
        self.check(AdapterCall::Insert, nth)?;
        self.store.0.borrow_mut().push(example_student());
        Ok(self.insert_result)
    }

    fn batch_insert(&self, rows: usize) -> Result<Vec<usize>, BackendError> {
        self.calls.batch_sizes.borrow_mut().push(rows);
        let nth = self.calls.bump(AdapterCall::BatchInsert);
        self.check(AdapterCall::BatchInsert, nth)?;
        self.store.0.borrow_mut().extend(generate_students(rows));
        Ok(vec![1; rows])
    }

    fn list(&self) -> Result<Vec<Student>, BackendError> {
        let nth = self.calls.bump(AdapterCall::List);
        self.check(AdapterCall::List, nth)?;
        Ok(self.store.0.borrow().clone())
    }

    fn map_list(&self) -> Result<Vec<FieldMap>, BackendError> {
        let nth = self.calls.bump(AdapterCall::MapList);
        self.check(AdapterCall::MapList, nth)?;
        Ok(self
            .store
            .0
            .borrow()
            .iter()
            .map(|s| {
                vec![
                    ("student_id".to_string(), Value::Integer(s.student_id)),
                    ("name".to_string(), Value::Text(s.name.clone())),
                ]
            })
            .collect())
    }

    fn delete(&self) -> Result<usize, BackendError> {
        let nth = self.calls.bump(AdapterCall::Delete);
        self.check(AdapterCall::Delete, nth)?;
        let mut rows = self.store.0.borrow_mut();
        let deleted = rows.len();
        rows.clear();
        Ok(deleted)
    }

    fn tune(&self, tuning: Tuning) -> Result<bool, BackendError> {
        if !self.tunable {
            return Ok(false);
        }
        self.calls.tunings.borrow_mut().push(tuning);
        Ok(true)
    }
}
