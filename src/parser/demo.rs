//! Materializes a small synthetic CSV fixture (mirrors the teacher's
//! `Demo`/`create_demo_data`), sized to exercise restricted-period
//! placement, teacher unavailability, and SPED capacity in one run.

use crate::error::Result;
use std::fs;
use std::path::Path;

pub fn write_demo_catalog(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    fs::write(
        dir.join("Period.csv"),
        concat!(
            "Period ID,Period Name,Start Time,End Time,Day of Week\n",
            "P1,R1,08:00,08:50,1\n",
            "P2,R2,08:55,09:45,1\n",
            "P3,G1,09:50,10:40,1\n",
            "P4,G2,10:45,11:35,1\n",
        ),
    )?;

    fs::write(
        dir.join("Teacher_Info.csv"),
        concat!(
            "Teacher ID,First Name,Last Name,Email,Department,Max Sections\n",
            "T001,Maria,Anderson,manderson@example.edu,Math,4\n",
            "T002,James,Baker,jbaker@example.edu,English,4\n",
            "T003,Linda,Clark,lclark@example.edu,Science,3\n",
            "T004,Omar,Davis,odavis@example.edu,Special,2\n",
        ),
    )?;

    fs::write(
        dir.join("Teacher_unavailability.csv"),
        concat!(
            "Teacher ID,Unavailable Periods\n",
            "T003,R1\n",
        ),
    )?;

    fs::write(
        dir.join("Student_Info.csv"),
        concat!(
            "Student ID,First Name,Last Name,Email,Grade Level,SPED\n",
            "S0001,Alice,Johnson,ajohnson@example.edu,10,no\n",
            "S0002,Ben,Smith,bsmith@example.edu,10,no\n",
            "S0003,Carla,Diaz,cdiaz@example.edu,10,yes\n",
            "S0004,Derek,Lee,dlee@example.edu,11,no\n",
            "S0005,Elena,Fox,efox@example.edu,11,yes\n",
            "S0006,Farid,Khan,fkhan@example.edu,11,no\n",
        ),
    )?;

    fs::write(
        dir.join("Sections_Information.csv"),
        concat!(
            "Section ID,Course ID,Teacher Assigned,Department,# of Seats Available,Room\n",
            "S001,Algebra I,T001,Math,30,101\n",
            "S002,English 10,T002,English,30,102\n",
            "S003,Biology,T003,Science,24,Lab1\n",
            "S004,Medical Career,T004,Special,15,103\n",
        ),
    )?;

    fs::write(
        dir.join("Student_Preference_Info.csv"),
        concat!(
            "Student ID,Preferred Sections,Required Sections\n",
            "S0001,Algebra I;English 10,Algebra I\n",
            "S0002,Algebra I;Biology,Algebra I\n",
            "S0003,Medical Career;English 10,Medical Career\n",
            "S0004,Biology;English 10,\n",
            "S0005,Medical Career;Algebra I,Medical Career\n",
            "S0006,English 10;Biology,\n",
        ),
    )?;

    Ok(())
}
