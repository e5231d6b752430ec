//! DispatchContext - every queue of the system, created once at startup
//!
//! Passed by reference into each component constructor instead of module-level
//! handles.

use crate::{BoundedQueue, ContractError, Department, Event, LogRecord, QueueCapacities};

/// Shared department queues, one per department
#[derive(Debug, Clone)]
pub struct DepartmentQueues {
    police: BoundedQueue<Event>,
    ambulance: BoundedQueue<Event>,
    fire_dept: BoundedQueue<Event>,
}

impl DepartmentQueues {
    pub fn new(capacities: &QueueCapacities) -> Result<Self, ContractError> {
        Ok(Self {
            police: BoundedQueue::new("PoliceQ", capacities.police)?,
            ambulance: BoundedQueue::new("AmbulanceQ", capacities.ambulance)?,
            fire_dept: BoundedQueue::new("FireDeptQ", capacities.fire_dept)?,
        })
    }

    pub fn get(&self, department: Department) -> &BoundedQueue<Event> {
        match department {
            Department::Police => &self.police,
            Department::Ambulance => &self.ambulance,
            Department::FireDept => &self.fire_dept,
        }
    }
}

/// All bounded queues of the system
#[derive(Debug, Clone)]
pub struct DispatchContext {
    dispatch: BoundedQueue<Event>,
    departments: DepartmentQueues,
    log: BoundedQueue<LogRecord>,
}

impl DispatchContext {
    /// Create every queue
    ///
    /// # Errors
    /// Any queue that cannot be created is an initialization failure.
    pub fn new(capacities: &QueueCapacities) -> Result<Self, ContractError> {
        Ok(Self {
            dispatch: BoundedQueue::new("DispatcherQ", capacities.dispatch)?,
            departments: DepartmentQueues::new(capacities)?,
            log: BoundedQueue::new("LoggerQ", capacities.log)?,
        })
    }

    /// EventSource -> Dispatcher
    pub fn dispatch_queue(&self) -> &BoundedQueue<Event> {
        &self.dispatch
    }

    /// Dispatcher -> WorkerPool of `department`
    pub fn department_queue(&self, department: Department) -> &BoundedQueue<Event> {
        self.departments.get(department)
    }

    pub fn department_queues(&self) -> &DepartmentQueues {
        &self.departments
    }

    /// Producers -> LogSink
    pub fn log_queue(&self) -> &BoundedQueue<LogRecord> {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_capacities() {
        let capacities = QueueCapacities {
            dispatch: 5,
            police: 1,
            ambulance: 2,
            fire_dept: 3,
            log: 4,
        };
        let ctx = DispatchContext::new(&capacities).unwrap();
        assert_eq!(ctx.dispatch_queue().capacity(), 5);
        assert_eq!(ctx.department_queue(Department::Police).capacity(), 1);
        assert_eq!(ctx.department_queue(Department::Ambulance).capacity(), 2);
        assert_eq!(ctx.department_queue(Department::FireDept).capacity(), 3);
        assert_eq!(ctx.log_queue().capacity(), 4);
        assert_eq!(ctx.department_queue(Department::FireDept).name(), "FireDeptQ");
    }

    #[test]
    fn test_context_rejects_zero_capacity() {
        let capacities = QueueCapacities {
            ambulance: 0,
            ..Default::default()
        };
        let err = DispatchContext::new(&capacities).unwrap_err();
        assert!(err.to_string().contains("AmbulanceQ"));
    }

    #[test]
    fn test_queues_are_independent() {
        let ctx = DispatchContext::new(&QueueCapacities::default()).unwrap();
        ctx.department_queue(Department::Police)
            .try_push(Event::new(crate::EventCode::Police, 1))
            .unwrap();
        assert_eq!(ctx.department_queue(Department::Police).len(), 1);
        assert_eq!(ctx.department_queue(Department::Ambulance).len(), 0);
        assert!(ctx.dispatch_queue().is_empty());
    }
}
